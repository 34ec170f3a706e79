//! Decorative status messages shown while an evaluation is being prepared.
//! They run before the provider call and do not shorten it.

use std::time::Duration;

use tracing::info;

pub const STATUS_PHRASES: [&str; 5] = [
    "🧠 Аналізую вимоги...",
    "⚖️ Вмикаю режим суворого відбору...",
    "🔍 Шукаю приховані ризики...",
    "💎 Відсіюю невідповідних кандидатів...",
    "🚀 Формую фінальний рейтинг...",
];

/// Emits each phrase in order, waiting `step` after each one, and returns
/// the sequence that was shown.
pub async fn play_status_sequence(step: Duration) -> Vec<String> {
    let mut shown = Vec::with_capacity(STATUS_PHRASES.len());
    for phrase in STATUS_PHRASES {
        info!(status = phrase, "evaluation progress");
        shown.push(phrase.to_string());
        if !step.is_zero() {
            tokio::time::sleep(step).await;
        }
    }
    shown
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_sequence_takes_five_steps() {
        let start = tokio::time::Instant::now();
        let shown = play_status_sequence(Duration::from_millis(700)).await;
        assert_eq!(shown.len(), 5);
        assert_eq!(shown[0], STATUS_PHRASES[0]);
        assert!(start.elapsed() >= Duration::from_millis(3500));
    }

    #[tokio::test]
    async fn test_zero_step_returns_immediately() {
        let shown = play_status_sequence(Duration::ZERO).await;
        assert_eq!(shown, STATUS_PHRASES.map(String::from).to_vec());
    }
}
