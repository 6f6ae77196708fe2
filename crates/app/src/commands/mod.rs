//! Subcommand implementations.

mod history;
mod practice;
pub mod render;

use std::error::Error;
use std::io::{BufRead, Write};

use mastery_core::generator::RandomSampler;
use mastery_core::model::SessionResult;
use mastery_core::timer::{TimerState, format_clock};
use rand::rngs::StdRng;
use services::{HistoryService, SessionError, TimerDriver, TimerDriverError};
use tokio::sync::watch;

use crate::prompt::Prompt;

pub use history::{clear, history, seed, stats};
pub use practice::{DrillArgs, SumsArgs, TableArgs, drill, sums, table};

pub type CommandResult = Result<(), Box<dyn Error>>;

const CONTROLS: &str = "Blank skips, p pauses or resumes, r deals new numbers, q finishes.";

/// Session timer as the practice loops see it.
struct PracticeClock {
    driver: TimerDriver,
    shown: watch::Receiver<u64>,
}

impl PracticeClock {
    fn new() -> Self {
        let driver = TimerDriver::new();
        let shown = driver.subscribe();
        Self { driver, shown }
    }

    fn start(&mut self) -> Result<(), TimerDriverError> {
        self.driver.start()
    }

    fn elapsed(&self) -> u64 {
        *self.shown.borrow()
    }

    fn is_paused(&self) -> bool {
        self.driver.state() == TimerState::Paused
    }

    /// Pause a running clock or resume a paused one.
    fn toggle(&mut self) -> Result<TimerState, TimerDriverError> {
        if self.is_paused() {
            self.driver.resume()?;
        } else {
            self.driver.pause()?;
        }
        Ok(self.driver.state())
    }

    /// Back to zero and running again.
    fn restart(&mut self) -> Result<(), TimerDriverError> {
        self.driver.reset();
        self.driver.start()
    }

    fn stop(&mut self) -> u64 {
        self.driver.stop()
    }
}

/// Outcome of reading one learner entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Answered,
    Refresh,
    Quit,
}

/// Ask until `apply` accepts the input.
///
/// `p` toggles the clock and asks again, `r` asks for a new deal, and `q` or
/// end of input quits. Answers are refused while the clock is paused.
fn read_entry<R: BufRead, W: Write>(
    prompt: &mut Prompt<R, W>,
    clock: &mut PracticeClock,
    question: &str,
    mut apply: impl FnMut(&str) -> Result<Option<i128>, SessionError>,
) -> Result<Step, Box<dyn Error>> {
    loop {
        let label = format!("[{}] {question}", format_clock(clock.elapsed()));
        let Some(line) = prompt.ask(&label)? else {
            return Ok(Step::Quit);
        };
        match line.trim().to_ascii_lowercase().as_str() {
            "q" => return Ok(Step::Quit),
            "r" => return Ok(Step::Refresh),
            "p" => {
                match clock.toggle()? {
                    TimerState::Paused => prompt.say("  Paused. p resumes.")?,
                    _ => prompt.say("  Resumed.")?,
                }
                continue;
            }
            _ => {}
        }
        if clock.is_paused() {
            prompt.say("  Paused. p resumes.")?;
            continue;
        }
        match apply(&line) {
            Ok(_) => return Ok(Step::Answered),
            Err(SessionError::Entry(err)) => prompt.say(format!("  {err}"))?,
            Err(err) => return Err(err.into()),
        }
    }
}

fn sampler(seed: Option<u64>) -> RandomSampler<StdRng> {
    RandomSampler::seeded(seed.unwrap_or_else(rand::random))
}

/// Print the score line and save unless disabled or nothing was checked.
async fn report_and_save<R: BufRead, W: Write>(
    prompt: &mut Prompt<R, W>,
    history: &HistoryService,
    result: &SessionResult,
    save: bool,
) -> CommandResult {
    prompt.say(format!(
        "Checked {}  correct {}  incorrect {}  accuracy {}%  time {}",
        result.total_problems(),
        result.correct(),
        result.incorrect(),
        result.accuracy(),
        format_clock(result.elapsed_secs()),
    ))?;
    if !save {
        return Ok(());
    }
    if result.total_problems() == 0 {
        prompt.say("Nothing checked; result not saved.")?;
        return Ok(());
    }
    match history.save(result).await {
        Ok(()) => prompt.say("Result saved.")?,
        // Already logged by the history service; the session itself is done.
        Err(err) => prompt.say(format!("Could not save result: {err}"))?,
    }
    Ok(())
}
