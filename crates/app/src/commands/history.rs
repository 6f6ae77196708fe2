use std::io::{BufRead, Write};

use chrono::Duration;
use mastery_core::generator::RandomSampler;
use mastery_core::model::{Operation, PracticeSettings, Problem, SessionKind};
use mastery_core::timer::format_duration;
use services::{DrillSession, HistoryService};

use super::{CommandResult, render};
use crate::prompt::Prompt;

fn kind_title(kind: Option<SessionKind>) -> &'static str {
    kind.map_or("All sessions", SessionKind::label)
}

pub async fn history<R: BufRead, W: Write>(
    kind: Option<SessionKind>,
    json: bool,
    history: &HistoryService,
    prompt: &mut Prompt<R, W>,
) -> CommandResult {
    if json {
        let results = history.list(kind).await?;
        prompt.say(serde_json::to_string_pretty(&results)?)?;
        return Ok(());
    }

    let groups = history.grouped_by_day(kind).await?;
    if groups.is_empty() {
        prompt.say("No saved sessions yet.")?;
        return Ok(());
    }
    prompt.say(kind_title(kind))?;
    for group in groups {
        prompt.say(group.day.format("%Y-%m-%d"))?;
        for result in &group.results {
            prompt.say(format!("  {}", render::result_line(result)))?;
        }
    }
    Ok(())
}

pub async fn stats<R: BufRead, W: Write>(
    kind: Option<SessionKind>,
    last: usize,
    history: &HistoryService,
    prompt: &mut Prompt<R, W>,
) -> CommandResult {
    let summary = history.summary(kind).await?;
    prompt.say(kind_title(kind))?;
    prompt.say(format!("  Sessions          {}", summary.sessions))?;
    prompt.say(format!("  Average accuracy  {}%", summary.average_accuracy))?;
    prompt.say(format!("  Problems solved   {}", summary.problems_solved))?;
    prompt.say(format!(
        "  Total time        {}",
        format_duration(summary.total_elapsed_secs)
    ))?;

    let trend = history.trend(kind, last).await?;
    if !trend.is_empty() {
        prompt.say("Accuracy trend")?;
        for point in trend {
            prompt.say(format!(
                "  #{:<3} {:>3}% {}",
                point.session,
                point.accuracy,
                render::accuracy_bar(point.accuracy)
            ))?;
        }
    }
    Ok(())
}

pub async fn clear<R: BufRead, W: Write>(
    yes: bool,
    history: &HistoryService,
    prompt: &mut Prompt<R, W>,
) -> CommandResult {
    if !yes && !prompt.confirm("Delete every saved session?")? {
        prompt.say("Nothing deleted.")?;
        return Ok(());
    }
    history.clear().await?;
    prompt.say("History cleared.")?;
    Ok(())
}

/// Record `count` played-out drills spread over past days.
pub async fn seed<R: BufRead, W: Write>(
    count: u16,
    history: &HistoryService,
    prompt: &mut Prompt<R, W>,
) -> CommandResult {
    let now = history.now();
    let base_seed: u64 = rand::random();
    for i in 0..count {
        let step = usize::from(i);
        let operation = Operation::ALL[step % Operation::ALL.len()];
        let digits = u32::from(i % 3) + 1;
        let settings = PracticeSettings::new(digits, 2, 10)?;
        let mut session = DrillSession::new(
            operation,
            settings,
            RandomSampler::seeded(base_seed.wrapping_add(u64::from(i))),
        )?;

        let solved = 4 + (step * 3) % 7;
        let answers: Vec<u64> = session.problems().iter().map(Problem::answer).collect();
        for (index, answer) in answers.into_iter().enumerate() {
            let entry = if index < solved {
                answer
            } else {
                answer.saturating_add(1)
            };
            session.answer(index, &entry.to_string())?;
        }
        session.score_all()?;

        let created_at = now - Duration::hours(9 * i64::from(i));
        let elapsed = 45 + (u64::from(i) * 13) % 240;
        history
            .save(&session.to_result(elapsed, created_at)?)
            .await?;
    }
    prompt.say(format!("Seeded {count} sessions."))?;
    Ok(())
}
