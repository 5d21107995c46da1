pub mod alert_board;
pub mod messenger;

pub use alert_board::AlertBoard;
pub use messenger::{LogMessenger, Messenger, WebhookMessenger};
