//! # Notices
//!
//! Every cart operation is a failure boundary: nothing escapes to the caller.
//! Failures end here, as one of four fixed pt-BR messages handed to the
//! [`Notifier`], or as silence.
//!
//! ## Failure Mapping
//! ```text
//! ┌──────────────────┬───────────────────────────────┬────────────────────┐
//! │ Operation        │ Failure                       │ Notice             │
//! ├──────────────────┼───────────────────────────────┼────────────────────┤
//! │ add              │ OutOfStock                    │ OutOfStock         │
//! │ add              │ anything else                 │ AddProductFailed   │
//! │ remove           │ anything                      │ RemoveProductFailed│
//! │ update           │ OutOfStock / InvalidAmount    │ OutOfStock         │
//! │ update           │ ProductNotInCart              │ (none)             │
//! │ update           │ anything else                 │ UpdateAmountFailed │
//! └──────────────────┴───────────────────────────────┴────────────────────┘
//! ```

use serde::Serialize;
use tokio::sync::mpsc;
use tracing::warn;

use rocket_core::CoreError;

use crate::error::StoreError;
use crate::ports::Notifier;

// =============================================================================
// Operations and Notices
// =============================================================================

/// The three cart mutations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    AddProduct,
    RemoveProduct,
    UpdateProductAmount,
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Operation::AddProduct => write!(f, "add_product"),
            Operation::RemoveProduct => write!(f, "remove_product"),
            Operation::UpdateProductAmount => write!(f, "update_product_amount"),
        }
    }
}

/// A user-visible failure category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CartNotice {
    OutOfStock,
    AddProductFailed,
    RemoveProductFailed,
    UpdateAmountFailed,
}

impl CartNotice {
    /// The message shown to the shopper.
    pub fn message(&self) -> &'static str {
        match self {
            CartNotice::OutOfStock => "Quantidade solicitada fora de estoque",
            CartNotice::AddProductFailed => "Erro na adição do produto",
            CartNotice::RemoveProductFailed => "Erro na remoção do produto",
            CartNotice::UpdateAmountFailed => "Erro na alteração de quantidade do produto",
        }
    }

    /// Maps a failed operation to the notice the shopper sees.
    ///
    /// Returns `None` when the failure is silent.
    pub fn for_failure(operation: Operation, error: &StoreError) -> Option<CartNotice> {
        let rule = error.rule();

        match operation {
            Operation::AddProduct => match rule {
                Some(CoreError::OutOfStock { .. }) => Some(CartNotice::OutOfStock),
                _ => Some(CartNotice::AddProductFailed),
            },
            Operation::RemoveProduct => Some(CartNotice::RemoveProductFailed),
            Operation::UpdateProductAmount => match rule {
                Some(e) if e.is_stock_rejection() => Some(CartNotice::OutOfStock),
                Some(CoreError::ProductNotInCart(_)) => None,
                _ => Some(CartNotice::UpdateAmountFailed),
            },
        }
    }
}

impl std::fmt::Display for CartNotice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.message())
    }
}

// =============================================================================
// Notifier Implementations
// =============================================================================

/// Logs each message at WARN.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn report_error(&self, message: &str) {
        warn!(notice = %message, "Cart notice");
    }
}

/// Forwards each message over an unbounded channel.
///
/// A dropped receiver is not an error: messages are discarded.
#[derive(Debug, Clone)]
pub struct ChannelNotifier {
    tx: mpsc::UnboundedSender<String>,
}

impl ChannelNotifier {
    /// Creates a notifier and the receiving end of its channel.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<String>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (ChannelNotifier { tx }, rx)
    }
}

impl Notifier for ChannelNotifier {
    fn report_error(&self, message: &str) {
        let _ = self.tx.send(message.to_string());
    }
}

/// Discards every message.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpNotifier;

impl Notifier for NoOpNotifier {
    fn report_error(&self, _message: &str) {}
}
