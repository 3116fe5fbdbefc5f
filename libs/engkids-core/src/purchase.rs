//! Purchase admission policy for the item shop.
//!
//! The same checks run inside the Postgres transaction and in the
//! in-memory store used by service tests, so the policy lives here.

use thiserror::Error;

/// Reasons a purchase is refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PurchaseDenied {
    #[error("item already owned")]
    AlreadyOwned,
    #[error("insufficient coins")]
    InsufficientCoins,
}

/// Decide whether a purchase may proceed. Ownership is checked before
/// funds, so owning an item never reveals the balance state.
pub fn admit(coins: i32, price: i32, already_owned: bool) -> Result<(), PurchaseDenied> {
    if already_owned {
        return Err(PurchaseDenied::AlreadyOwned);
    }
    if coins < price {
        return Err(PurchaseDenied::InsufficientCoins);
    }
    Ok(())
}
