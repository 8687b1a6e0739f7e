//! Document delivery to the forwarding partner.
//!
//! Primary path: SFTP into `<base_dir>/<bookingRef>/`. Fallback path, used
//! when SFTP is unconfigured or fails: email attachments to the operations
//! mailbox. A failure on the fallback path is logged for manual follow-up
//! and never fails the parent booking.

pub mod channel;
pub mod email;
pub mod sftp;

pub use channel::DeliveryChannel;
