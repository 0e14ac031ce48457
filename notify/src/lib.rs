//! Push notifications.
//!
//! Device tokens live in the store ([`idv_store::DeviceTokenStore`]); the
//! actual delivery sits behind [`PushSender`]. [`FcmSender`] talks to the
//! Firebase legacy HTTP endpoint.
//!
//! Three message sources feed it: verification outcomes, wallet events and
//! direct messages ([`DirectMessageNotifier`]).

pub mod dm;
pub mod error;
pub mod fcm;
pub mod message;
pub mod notifier;
pub mod wallet;

pub use dm::{
    message_preview, sender_title, DirectMessageNotifier, DirectMessageOutcome, MessageInserted,
    MessageRecord, DM_CHANNEL_ID, DM_EVENT,
};
pub use error::NotifyError;
pub use fcm::{FcmSender, FCM_LEGACY_ENDPOINT};
pub use message::{verification_message, PushMessage};
pub use notifier::{Notifier, NotifyOutcome, PushSender};
pub use wallet::{WalletNotification, DEFAULT_WALLET_EVENT};
