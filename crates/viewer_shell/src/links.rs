//! Opening the links of activated entities.

use std::io;

use tracing::{debug, info, warn};
use viewer_core::ViewerEvent;

/// Link prefixes handed to the system opener. Anything else could name a
/// local program or file, so it is refused.
const OPENABLE: [&str; 3] = ["https://", "http://", "mailto:"];

/// Open the link carried by `event` with `opener`. Returns whether the
/// opener was invoked and succeeded.
pub fn follow(event: &ViewerEvent, opener: impl FnOnce(&str) -> io::Result<()>) -> bool {
    let ViewerEvent::Activated { entity, link } = event;
    let Some(link) = link.as_deref().map(str::trim).filter(|l| !l.is_empty()) else {
        debug!(%entity, "activated entity has no link");
        return false;
    };
    if !is_openable(link) {
        warn!(%entity, link, "refusing to open link with unsupported scheme");
        return false;
    }
    match opener(link) {
        Ok(()) => {
            info!(%entity, link, "opened link");
            true
        }
        Err(err) => {
            warn!(%entity, link, "failed to open link: {err}");
            false
        }
    }
}

fn is_openable(link: &str) -> bool {
    OPENABLE.iter().any(|prefix| {
        link.get(..prefix.len())
            .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
    })
}
