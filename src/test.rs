#[cfg(test)]
pub mod test {
    use anyhow::{anyhow, Result};
    use std::fs::{self, File};
    use std::io::{BufRead, BufReader};
    use std::time::{Duration, Instant};

    use crate::{Baseline, Board, Solver};

    /// One line of `test_data/positions`: a grid with '/' between rows, the
    /// expected output with the draw baseline, then with the unbounded baseline
    struct Case {
        board: Board,
        draw: String,
        unbounded: String,
    }

    fn load_cases(path: &str) -> Result<Vec<Case>> {
        let file = BufReader::new(File::open(path)?);
        let mut cases = vec![];

        for line in file.lines() {
            let buf = line?;
            if buf.trim().is_empty() {
                continue;
            }
            let fields: Vec<&str> = buf.split_whitespace().collect();
            if fields.len() != 5 {
                return Err(anyhow!("invalid test data: {}", buf));
            }
            cases.push(Case {
                board: Board::from_grid(fields[0].replace('/', "\n"))?,
                draw: format!("{} {}", fields[1], fields[2]),
                unbounded: format!("{} {}", fields[3], fields[4]),
            });
        }
        Ok(cases)
    }

    fn run_cases(baseline: Baseline) -> Result<()> {
        let cases = load_cases("test_data/positions")?;

        let mut times = vec![];
        let mut posis = vec![];

        for case in cases.iter() {
            let mut solver = Solver::new(case.board).with_baseline(baseline);
            let start_time = Instant::now();
            let result = solver.solve();
            let finish_time = Instant::now();

            let expected = match baseline {
                Baseline::Draw => &case.draw,
                Baseline::Unbounded => &case.unbounded,
            };
            assert_eq!(&result.to_string(), expected, "position:\n{}", case.board);
            times.push(finish_time - start_time);
            posis.push(solver.node_count);
        }

        println!(
            "{:?} baseline\nMean time: {:.6}ms, Mean no. of positions: {}",
            baseline,
            (times.iter().sum::<Duration>() / times.len() as u32).as_secs_f64() * 1000.0,
            posis.iter().sum::<usize>() as f64 / posis.len() as f64,
        );
        Ok(())
    }

    #[test]
    pub fn positions_draw_baseline() -> Result<()> {
        run_cases(Baseline::Draw)
    }

    #[test]
    pub fn positions_unbounded_baseline() -> Result<()> {
        run_cases(Baseline::Unbounded)
    }

    #[test]
    pub fn forced_double_threat_loses() -> Result<()> {
        // O threatens both ends of its bottom row, X can only block one
        let board = Board::from_grid(fs::read_to_string("test_data/double_threat.txt")?)?;
        assert_eq!(board.to_string(), ".....\n.....\n.XX..\n.OO..");
        let mut solver = Solver::new(board);
        let result = solver.solve();
        assert_eq!(result.utility, -1);
        assert_eq!(result.best_move, None);

        for column in board.legal_moves() {
            let next = board.play(column).unwrap();
            assert_eq!(Solver::new(next).solve().utility, -1);
        }
        Ok(())
    }

    #[test]
    pub fn best_play_draws() -> Result<()> {
        let board = Board::from_moves("43143342")?;
        let mut solver = Solver::new(board);
        let result = solver.solve();
        assert_eq!(result.utility, 0);

        // following the first drawing move each turn reaches a full board
        let mut board = board;
        while let Some(column) = Solver::new(board)
            .with_baseline(Baseline::Unbounded)
            .solve()
            .best_move
        {
            board = board.play(column).unwrap();
        }
        assert!(board.is_full());
        assert_eq!(crate::evaluation::evaluate(&board).utility, 0);
        Ok(())
    }
}
