// =====================================================================================
// NOTIFY CELL - ALERT BOARD & OUTBOUND MESSAGING
// =====================================================================================
//
// Outbound effects of the watchdog:
// - The in-app alert board (create/dismiss by stable notification id)
// - Forwarding to an arbitrary messaging channel addressed as namespace.action
//
// =====================================================================================

pub mod models;
pub mod services;

pub use models::{ActiveAlert, NotifyError, NotifyTarget};
pub use services::alert_board::AlertBoard;
pub use services::messenger::{LogMessenger, Messenger, WebhookMessenger};
