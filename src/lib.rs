//! **sway-icon-to-go** names sway workspaces after the windows on them.
//!
//! Every window is resolved to an icon (a Font Awesome glyph) by matching
//! its title, or failing that its executable name, against a configurable
//! rule table.  Each workspace is then renamed to `"<number>: <icons>"`
//! whenever its window set changes.
//!
//! # Architecture
//!
//! The pipeline is written against the capability traits in [`traits`]:
//!
//! * [`traits::TreeProvider`] / [`traits::CommandSender`]: read the window
//!   tree and send rename commands.
//! * [`traits::EventSource`]: deliver window events into a channel.
//! * [`traits::ExecutableLookup`]: pid to executable name.
//! * [`traits::ConfigSource`]: produce a configuration on (re)load.
//!
//! [`daemon::Daemon`] drives one event at a time through
//! [`workspace`] → [`resolver`] → [`formatter`] → [`reconcile`].
//! [`reload::ConfigReloader`] swaps in a new configuration generation while
//! the daemon runs.  Concrete sway backends live in [`sway`].

pub mod cache;
pub mod config;
pub mod daemon;
pub mod fontawesome;
pub mod formatter;
pub mod icons;
pub mod proc;
pub mod reconcile;
pub mod reload;
pub mod resolver;
pub mod sway;
pub mod traits;
pub mod tree;
pub mod workspace;
