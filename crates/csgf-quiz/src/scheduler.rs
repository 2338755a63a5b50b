//! Quiz scheduler: transfers open quiz rounds, chat answers close them.
//!
//! [`QuizState`] holds the transitions and returns the outbound actions each
//! event produces, in the order they must be sent. [`MathQuiz`] wires it to
//! the stream as an [`EventObserver`] and performs those actions.

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use csgf_core::{Amount, ChatMessage, EventObserver, TransferNotice, UserId, VenueActions};

use crate::expression::{self, Expression};

const BPS_DENOMINATOR: i64 = 10_000;
const MIN_PAYOUT: Amount = Amount::from_units(1);

/// Prize for a transfer of `amount` after `commission_bps` basis points are
/// kept: floored to whole cents, never less than 1.00.
pub fn payout(amount: Amount, commission_bps: u32) -> Amount {
    let keep = BPS_DENOMINATOR - i64::from(commission_bps).min(BPS_DENOMINATOR);
    let cents = i128::from(amount.cents()) * i128::from(keep) / i128::from(BPS_DENOMINATOR);
    let cents = i64::try_from(cents).unwrap_or(i64::MAX);
    Amount::from_cents(cents).max(MIN_PAYOUT)
}

/// One quiz round, funded by a single transfer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MiniGameRound {
    /// Display name of the participant whose transfer funded the round.
    pub creator: String,
    pub expression: String,
    pub expected_answer: i64,
    pub payout: Amount,
}

impl MiniGameRound {
    pub fn new(creator: impl Into<String>, expression: &Expression, payout: Amount) -> Self {
        Self {
            creator: creator.into(),
            expression: expression.render(),
            // Generated literals are single digits; the value cannot overflow.
            expected_answer: expression.value().unwrap_or_default(),
            payout,
        }
    }

    pub fn announcement(&self) -> String {
        format!(
            "{}, создал пример переведя на этот аккаунт {}. Пример:{}",
            self.creator, self.payout, self.expression
        )
    }
}

/// An action the quiz wants performed, in emission order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outbound {
    Chat(String),
    Transfer { to: UserId, amount: Amount },
}

/// Idle when nothing is active; otherwise one active round plus a FIFO
/// backlog. Rounds never time out.
#[derive(Debug, Clone)]
pub struct QuizState {
    commission_bps: u32,
    active: Option<MiniGameRound>,
    queue: VecDeque<MiniGameRound>,
}

impl QuizState {
    pub fn new(commission_bps: u32) -> Self {
        Self {
            commission_bps,
            active: None,
            queue: VecDeque::new(),
        }
    }

    pub fn active(&self) -> Option<&MiniGameRound> {
        self.active.as_ref()
    }

    pub fn queued(&self) -> usize {
        self.queue.len()
    }

    /// A transfer arrived: open a round for it, or queue it behind the
    /// active one.
    pub fn on_transfer(&mut self, notice: &TransferNotice, expression: &Expression) -> Vec<Outbound> {
        let round = MiniGameRound::new(
            notice.from_display_name.as_str(),
            expression,
            payout(notice.amount, self.commission_bps),
        );
        if self.active.is_some() {
            debug!(creator = %round.creator, queued = self.queue.len() + 1, "quiz round queued");
            self.queue.push_back(round);
            return vec![];
        }
        let announce = Outbound::Chat(round.announcement());
        self.active = Some(round);
        vec![announce]
    }

    /// A chat line arrived: if it answers the active round, pay the author
    /// and move on to the next queued round.
    pub fn on_chat(&mut self, message: &ChatMessage) -> Vec<Outbound> {
        let Some(active) = &self.active else {
            return vec![];
        };
        let Ok(answer) = message.text.trim().parse::<i64>() else {
            return vec![];
        };
        if answer != active.expected_answer {
            return vec![];
        }

        let mut actions = vec![
            Outbound::Chat(format!("Победитель: {}", message.display_name)),
            Outbound::Transfer {
                to: message.user,
                amount: active.payout,
            },
        ];
        self.active = self.queue.pop_front();
        if let Some(next) = &self.active {
            actions.push(Outbound::Chat(next.announcement()));
        }
        actions
    }
}

struct Inner {
    state: QuizState,
    rng: StdRng,
}

/// The quiz as a stream observer.
///
/// The state lock covers one transition; the resulting actions are sent
/// afterwards, in order. A failed send is logged and not retried, and the
/// state change stands.
pub struct MathQuiz {
    actions: Arc<dyn VenueActions>,
    inner: Mutex<Inner>,
}

impl MathQuiz {
    pub fn new(actions: Arc<dyn VenueActions>, commission_bps: u32) -> Self {
        Self::with_rng(actions, commission_bps, StdRng::from_entropy())
    }

    pub fn with_rng(actions: Arc<dyn VenueActions>, commission_bps: u32, rng: StdRng) -> Self {
        Self {
            actions,
            inner: Mutex::new(Inner {
                state: QuizState::new(commission_bps),
                rng,
            }),
        }
    }

    /// Snapshot of the transition state.
    pub async fn state(&self) -> QuizState {
        self.inner.lock().await.state.clone()
    }

    async fn perform(&self, outbound: Vec<Outbound>) {
        for action in outbound {
            let result = match &action {
                Outbound::Chat(text) => self.actions.send_chat_message(text).await,
                Outbound::Transfer { to, amount } => self.actions.send_transfer(*to, *amount).await,
            };
            if let Err(e) = result {
                warn!(action = ?action, error = %e, "quiz action failed");
            }
        }
    }
}

#[async_trait]
impl EventObserver for MathQuiz {
    fn name(&self) -> &str {
        "math-quiz"
    }

    async fn on_chat_message(&self, message: &ChatMessage) {
        let outbound = self.inner.lock().await.state.on_chat(message);
        if !outbound.is_empty() {
            info!(winner = %message.display_name, user = %message.user, "quiz answered");
        }
        self.perform(outbound).await;
    }

    async fn on_transfer(&self, notice: &TransferNotice) {
        let outbound = {
            let mut inner = self.inner.lock().await;
            let expression = expression::generate(&mut inner.rng);
            inner.state.on_transfer(notice, &expression)
        };
        info!(from = %notice.from_display_name, amount = %notice.amount, "quiz funded");
        self.perform(outbound).await;
    }
}
