use std::error::Error;
use std::io::{BufRead, Write};

use clap::Args;
use mastery_core::generator::OperandSampler;
use mastery_core::model::{GridCoordinate, Operation, PracticeSettings};
use mastery_core::scorer::{CellStatus, ExpectedValues};
use services::{AggregationSession, DrillSession, HistoryService, PracticeTableSession};

use super::{CONTROLS, CommandResult, PracticeClock, Step, read_entry, render, report_and_save, sampler};
use crate::prompt::Prompt;

/// Flags shared by every practice mode.
#[derive(Debug, Clone, Args)]
pub struct SessionArgs {
    /// Seed for reproducible problems
    #[arg(long)]
    pub seed: Option<u64>,

    /// Do not save the result
    #[arg(long)]
    pub no_save: bool,
}

#[derive(Debug, Clone, Args)]
pub struct DrillArgs {
    /// addition, subtraction, multiplication or division
    #[arg(long, short, default_value = "addition")]
    pub op: Operation,

    /// Digits per operand
    #[arg(long, short, default_value_t = 2)]
    pub digits: u32,

    /// Operands per problem
    #[arg(long, default_value_t = 2)]
    pub operands: usize,

    /// Problems in the batch
    #[arg(long, short = 'n', default_value_t = 10)]
    pub count: usize,

    #[command(flatten)]
    pub session: SessionArgs,
}

#[derive(Debug, Clone, Args)]
pub struct TableArgs {
    /// addition, subtraction, multiplication or division
    #[arg(long, short, default_value = "multiplication")]
    pub op: Operation,

    /// Digits per header
    #[arg(long, short, default_value_t = 1)]
    pub digits: u32,

    /// Row and column headers
    #[arg(long, default_value_t = 10)]
    pub headers: usize,

    #[command(flatten)]
    pub session: SessionArgs,
}

#[derive(Debug, Clone, Args)]
pub struct SumsArgs {
    /// Grid rows and columns
    #[arg(long, default_value_t = 5)]
    pub size: usize,

    /// Digits per grid value
    #[arg(long, short, default_value_t = 2)]
    pub digits: u32,

    #[command(flatten)]
    pub session: SessionArgs,
}

//
// ─── DRILL ─────────────────────────────────────────────────────────────────────
//

pub async fn drill<R: BufRead, W: Write>(
    args: &DrillArgs,
    history: &HistoryService,
    prompt: &mut Prompt<R, W>,
) -> CommandResult {
    let settings = PracticeSettings::new(args.digits, args.operands, args.count)?;
    let mut session = DrillSession::new(args.op, settings, sampler(args.session.seed))?;

    let mut clock = PracticeClock::new();
    clock.start()?;
    play_drill(&mut session, prompt, &mut clock)?;
    let elapsed = clock.stop();

    let result = session.to_result(elapsed, history.now())?;
    report_and_save(prompt, history, &result, !args.session.no_save).await
}

fn play_drill<S: OperandSampler, R: BufRead, W: Write>(
    session: &mut DrillSession<S>,
    prompt: &mut Prompt<R, W>,
    clock: &mut PracticeClock,
) -> Result<(), Box<dyn Error>> {
    'deal: loop {
        prompt.say(format!(
            "{} drill, {} problems. {CONTROLS}",
            session.operation().label(),
            session.problems().len()
        ))?;

        for index in 0..session.problems().len() {
            let question = format!("{:>3}. {} ", index + 1, session.problems()[index].prompt());
            match read_entry(prompt, clock, &question, |raw| session.answer(index, raw))? {
                Step::Answered => {}
                Step::Refresh => {
                    session.refresh()?;
                    clock.restart()?;
                    continue 'deal;
                }
                Step::Quit => break,
            }
        }
        break;
    }

    session.score_all()?;
    for (index, problem) in session.problems().iter().enumerate() {
        if session.status(index) == CellStatus::Incorrect {
            prompt.say(format!(
                "  ✗ {}. {}{}",
                index + 1,
                problem.prompt().trim_end_matches('?'),
                problem.answer()
            ))?;
        }
    }
    Ok(())
}

//
// ─── CROSS TABLE ───────────────────────────────────────────────────────────────
//

pub async fn table<R: BufRead, W: Write>(
    args: &TableArgs,
    history: &HistoryService,
    prompt: &mut Prompt<R, W>,
) -> CommandResult {
    let settings = PracticeSettings::default()
        .with_digit_count(args.digits)?
        .with_header_count(args.headers)?;
    let mut session = PracticeTableSession::new(args.op, settings, sampler(args.session.seed))?;

    let mut clock = PracticeClock::new();
    clock.start()?;
    play_table(&mut session, prompt, &mut clock)?;
    let elapsed = clock.stop();

    let result = session.to_result(elapsed, history.now())?;
    report_and_save(prompt, history, &result, !args.session.no_save).await
}

fn play_table<S: OperandSampler, R: BufRead, W: Write>(
    session: &mut PracticeTableSession<S>,
    prompt: &mut Prompt<R, W>,
    clock: &mut PracticeClock,
) -> Result<(), Box<dyn Error>> {
    'deal: loop {
        prompt.say(render::cross_table(session.table()))?;
        prompt.say(format!("Fill the table cell by cell. {CONTROLS}"))?;

        let operation = session.operation();
        let rows = session.table().row_headers().to_vec();
        let cols = session.table().col_headers().to_vec();
        for (row, &r) in rows.iter().enumerate() {
            for (col, &c) in cols.iter().enumerate() {
                let shown = operation.display_order(vec![r, c]);
                let question = format!("{} {} {} = ", shown[0], operation.symbol(), shown[1]);
                match read_entry(prompt, clock, &question, |raw| session.enter(row, col, raw))? {
                    Step::Answered => {}
                    Step::Refresh => {
                        session.refresh()?;
                        clock.restart()?;
                        continue 'deal;
                    }
                    Step::Quit => break 'deal,
                }
                if session
                    .answers()
                    .get(GridCoordinate::Cell { row, col })
                    .is_some()
                {
                    session.focus(row, col)?;
                    let status = session.check_focused()?;
                    prompt.say(format!("  {}", render::status_mark(status)))?;
                }
            }
        }
        break;
    }
    Ok(())
}

//
// ─── AGGREGATION ───────────────────────────────────────────────────────────────
//

pub async fn sums<R: BufRead, W: Write>(
    args: &SumsArgs,
    history: &HistoryService,
    prompt: &mut Prompt<R, W>,
) -> CommandResult {
    let settings = PracticeSettings::default().with_grid(args.size, args.digits)?;
    let mut session = AggregationSession::new(settings, sampler(args.session.seed))?;

    let mut clock = PracticeClock::new();
    clock.start()?;
    play_sums(&mut session, prompt, &mut clock)?;
    let elapsed = clock.stop();

    let result = session.to_result(elapsed, history.now())?;
    report_and_save(prompt, history, &result, !args.session.no_save).await
}

fn target_label(coord: GridCoordinate) -> String {
    match coord {
        GridCoordinate::RowSum(i) => format!("Row {} sum", i + 1),
        GridCoordinate::ColSum(j) => format!("Column {} sum", j + 1),
        GridCoordinate::GrandTotal => "Grand total".to_string(),
        GridCoordinate::Cell { row, col } => format!("Cell {},{}", row + 1, col + 1),
    }
}

fn play_sums<S: OperandSampler, R: BufRead, W: Write>(
    session: &mut AggregationSession<S>,
    prompt: &mut Prompt<R, W>,
    clock: &mut PracticeClock,
) -> Result<(), Box<dyn Error>> {
    let targets: Vec<GridCoordinate> = session.grid().targets().collect();
    'deal: loop {
        prompt.say(render::aggregation_grid(session.grid()))?;
        prompt.say(format!(
            "Sum every row, every column, then the whole grid. {CONTROLS}"
        ))?;

        for &coord in &targets {
            let question = format!("{}: ", target_label(coord));
            match read_entry(prompt, clock, &question, |raw| session.enter(coord, raw))? {
                Step::Answered => {}
                Step::Refresh => {
                    session.refresh()?;
                    clock.restart()?;
                    continue 'deal;
                }
                Step::Quit => break,
            }
        }
        break;
    }

    session.recheck()?;
    for &coord in &targets {
        if session.status(coord) == CellStatus::Incorrect {
            prompt.say(format!(
                "  ✗ {}: expected {}",
                target_label(coord),
                session.grid().expected(coord)?
            ))?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use mastery_core::generator::ScriptedSampler;
    use mastery_core::timer::TimerState;
    use std::io::Cursor;

    fn output(prompt: &Prompt<Cursor<&str>, Vec<u8>>) -> String {
        String::from_utf8_lossy(prompt.output()).into_owned()
    }

    #[test]
    fn drill_reprompts_bad_input_and_reports_misses() {
        let settings = PracticeSettings::new(1, 2, 3).unwrap();
        // 3 + 4, 5 + 1, 2 + 2
        let mut session =
            DrillSession::new(Operation::Addition, settings, ScriptedSampler::new(vec![3, 4, 5, 1, 2, 2]))
                .unwrap();
        let mut prompt = Prompt::new(Cursor::new("seven\n7\n5\n\n"), Vec::new());

        play_drill(&mut session, &mut prompt, &mut PracticeClock::new()).unwrap();

        assert_eq!(session.score().checked_count(), 2);
        assert_eq!(session.score().correct_count(), 1);
        let out = output(&prompt);
        assert!(out.contains("not a whole number"), "{out}");
        assert!(out.contains("✗ 2. 5 + 1 = 6"), "{out}");
    }

    #[test]
    fn table_checks_each_answered_cell() {
        let settings = PracticeSettings::default()
            .with_digit_count(1)
            .unwrap()
            .with_header_count(2)
            .unwrap();
        // cols [5, 3], rows [7, 2]
        let mut session = PracticeTableSession::new(
            Operation::Addition,
            settings,
            ScriptedSampler::new(vec![5, 7, 3, 2]),
        )
        .unwrap();
        let mut prompt = Prompt::new(Cursor::new("12\n9\nq\n"), Vec::new());

        play_table(&mut session, &mut prompt, &mut PracticeClock::new()).unwrap();

        assert_eq!(session.status(0, 0), CellStatus::Correct);
        assert_eq!(session.status(0, 1), CellStatus::Incorrect);
        assert_eq!(session.status(1, 0), CellStatus::Unchecked);
        assert_eq!(session.score().accuracy(), 50);
        assert!(output(&prompt).contains("[00:00] 7 + 5 = "));
    }

    #[test]
    fn sums_lists_expected_values_for_misses() {
        let settings = PracticeSettings::default().with_grid(2, 2).unwrap();
        // [[10, 20], [30, 40]]
        let mut session =
            AggregationSession::new(settings, ScriptedSampler::new(vec![10, 20, 30, 40])).unwrap();
        let mut prompt = Prompt::new(Cursor::new("30\n71\n"), Vec::new());

        play_sums(&mut session, &mut prompt, &mut PracticeClock::new()).unwrap();

        assert_eq!(session.score().checked_count(), 2);
        assert_eq!(session.score().accuracy(), 50);
        assert!(output(&prompt).contains("✗ Row 2 sum: expected 70"));
    }

    fn addition_drill(values: Vec<u64>, batch: usize) -> DrillSession<ScriptedSampler> {
        let settings = PracticeSettings::new(1, 2, batch).unwrap();
        DrillSession::new(Operation::Addition, settings, ScriptedSampler::new(values)).unwrap()
    }

    #[tokio::test]
    async fn paused_clock_refuses_answers_until_resumed() {
        let mut session = addition_drill(vec![3, 4], 1);
        let mut clock = PracticeClock::new();
        clock.start().unwrap();
        let mut prompt = Prompt::new(Cursor::new("p\n7\np\n7\n"), Vec::new());

        play_drill(&mut session, &mut prompt, &mut clock).unwrap();

        assert_eq!(session.score().correct_count(), 1);
        assert_eq!(clock.driver.state(), TimerState::Running);
        let out = output(&prompt);
        assert_eq!(out.matches("Paused. p resumes.").count(), 2, "{out}");
        assert!(out.contains("Resumed."), "{out}");
    }

    #[tokio::test]
    async fn refresh_deals_a_new_batch_and_restarts_the_clock() {
        // 3 + 4, then 5 + 1 after the refresh
        let mut session = addition_drill(vec![3, 4, 5, 1], 1);
        let mut clock = PracticeClock::new();
        clock.start().unwrap();
        let mut prompt = Prompt::new(Cursor::new("r\n6\n"), Vec::new());

        play_drill(&mut session, &mut prompt, &mut clock).unwrap();

        assert_eq!(session.problems()[0].operands(), &[5, 1]);
        assert_eq!(session.score().correct_count(), 1);
        assert_eq!(clock.elapsed(), 0);
        assert_eq!(clock.driver.state(), TimerState::Running);
        assert_eq!(output(&prompt).matches("Addition drill").count(), 2);
    }

    #[tokio::test]
    async fn refresh_redraws_the_sum_grid() {
        let settings = PracticeSettings::default().with_grid(2, 2).unwrap();
        // [[10, 20], [30, 40]] then [[11, 12], [13, 14]]
        let mut session = AggregationSession::new(
            settings,
            ScriptedSampler::new(vec![10, 20, 30, 40, 11, 12, 13, 14]),
        )
        .unwrap();
        let mut clock = PracticeClock::new();
        clock.start().unwrap();
        let mut prompt = Prompt::new(Cursor::new("30\nr\n23\n"), Vec::new());

        play_sums(&mut session, &mut prompt, &mut clock).unwrap();

        assert_eq!(session.grid().rows()[0], vec![11, 12]);
        assert_eq!(session.score().checked_count(), 1);
        assert_eq!(session.score().accuracy(), 100);
    }
}
