//! Per-visitor data kept in the session: cart, recently viewed products and
//! the support chat transcript.

use tower_sessions::Session;
use tower_sessions::session::Error;

use commerce_wave_core::ProductId;

use crate::ai::ChatTranscript;
use crate::cart::CartStore;
use crate::models::session::keys;

/// Most product ids remembered as recently viewed.
pub const MAX_RECENTLY_VIEWED: usize = 10;

/// Load the visitor's cart; a new session starts with an empty cart.
///
/// # Errors
///
/// Returns an error if the session store cannot be read.
pub async fn load_cart(session: &Session) -> Result<CartStore, Error> {
    Ok(session.get(keys::CART).await?.unwrap_or_default())
}

/// Persist the visitor's cart.
///
/// # Errors
///
/// Returns an error if the session store cannot be written.
pub async fn save_cart(session: &Session, cart: &CartStore) -> Result<(), Error> {
    session.insert(keys::CART, cart).await
}

/// Product ids from detail-page visits, oldest first.
///
/// # Errors
///
/// Returns an error if the session store cannot be read.
pub async fn recently_viewed(session: &Session) -> Result<Vec<ProductId>, Error> {
    Ok(session.get(keys::RECENTLY_VIEWED).await?.unwrap_or_default())
}

/// Record a detail-page visit, moving a repeat visit to the end. Returns
/// whether the history changed (false when it was already the latest view).
///
/// # Errors
///
/// Returns an error if the session store cannot be read or written.
pub async fn record_view(session: &Session, product_id: &ProductId) -> Result<bool, Error> {
    let mut viewed = recently_viewed(session).await?;
    if viewed.last() == Some(product_id) {
        return Ok(false);
    }
    push_recent(&mut viewed, product_id.clone());
    session.insert(keys::RECENTLY_VIEWED, viewed).await?;
    Ok(true)
}

fn push_recent(viewed: &mut Vec<ProductId>, product_id: ProductId) {
    viewed.retain(|id| *id != product_id);
    viewed.push(product_id);
    if viewed.len() > MAX_RECENTLY_VIEWED {
        let excess = viewed.len() - MAX_RECENTLY_VIEWED;
        viewed.drain(..excess);
    }
}

/// Load the chat transcript; a new session starts with the greeting.
///
/// # Errors
///
/// Returns an error if the session store cannot be read.
pub async fn load_transcript(session: &Session) -> Result<ChatTranscript, Error> {
    Ok(session.get(keys::CHAT_TRANSCRIPT).await?.unwrap_or_default())
}

/// Persist the chat transcript.
///
/// # Errors
///
/// Returns an error if the session store cannot be written.
pub async fn save_transcript(session: &Session, transcript: &ChatTranscript) -> Result<(), Error> {
    session.insert(keys::CHAT_TRANSCRIPT, transcript).await
}
