pub use crate::base::{
    config::Config,
    types::{ChatContext, ClassifiedEvent, Err, Identity, MembershipAction, RawEvent, Res, Void},
};
pub use anyhow::anyhow;
pub use tracing::{debug, error, info, instrument, warn};
