//! Order-up-to inventory policies.
//!
//! A policy is a pure function from an inventory-position observation to a
//! non-negative order quantity: `q = max(0, S − position)`.  Which position
//! the engine feeds it (local or echelon) is decided by the variant; the
//! balanced-echelon variant additionally receives the immediate downstream
//! node's adjusted echelon position and will not order past it, preventing
//! one sibling in an assembly structure from racing ahead of another.

// ── PolicyKind ────────────────────────────────────────────────────────────────

/// Closed set of supported policy variants.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PolicyKind {
    /// Order up to `base_stock_level` against the node's local inventory
    /// position.
    LocalBaseStock { base_stock_level: f64 },
    /// Order up to `base_stock_level` against the node's echelon inventory
    /// position.
    EchelonBaseStock { base_stock_level: f64 },
    /// Echelon base-stock, capped so the node's position does not exceed the
    /// immediate downstream node's adjusted echelon position.
    BalancedEchelonBaseStock { base_stock_level: f64 },
}

// ── InventoryPolicy ───────────────────────────────────────────────────────────

/// A node's ordering rule.  Pure: holds no state between periods.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct InventoryPolicy {
    pub kind: PolicyKind,
}

impl InventoryPolicy {
    pub fn local_base_stock(base_stock_level: f64) -> Self {
        Self { kind: PolicyKind::LocalBaseStock { base_stock_level } }
    }

    pub fn echelon_base_stock(base_stock_level: f64) -> Self {
        Self { kind: PolicyKind::EchelonBaseStock { base_stock_level } }
    }

    pub fn balanced_echelon_base_stock(base_stock_level: f64) -> Self {
        Self { kind: PolicyKind::BalancedEchelonBaseStock { base_stock_level } }
    }

    /// The order-up-to target.
    pub fn base_stock_level(&self) -> f64 {
        match self.kind {
            PolicyKind::LocalBaseStock { base_stock_level }
            | PolicyKind::EchelonBaseStock { base_stock_level }
            | PolicyKind::BalancedEchelonBaseStock { base_stock_level } => base_stock_level,
        }
    }

    /// Whether the engine must observe the echelon (rather than local)
    /// inventory position for this policy.
    pub fn uses_echelon_position(&self) -> bool {
        !matches!(self.kind, PolicyKind::LocalBaseStock { .. })
    }

    /// Whether the engine must supply the downstream adjusted-position signal.
    pub fn needs_adjusted_position(&self) -> bool {
        matches!(self.kind, PolicyKind::BalancedEchelonBaseStock { .. })
    }

    /// Map a position observation to a non-negative order quantity.
    ///
    /// `adjusted_position` is the immediate downstream node's adjusted
    /// echelon position (balanced variant only; ignored otherwise).
    /// `capacity`, when present, caps the result.
    pub fn order_quantity(
        &self,
        position:          f64,
        adjusted_position: Option<f64>,
        capacity:          Option<f64>,
    ) -> f64 {
        let mut quantity = (self.base_stock_level() - position).max(0.0);

        if self.needs_adjusted_position() {
            if let Some(adjusted) = adjusted_position {
                quantity = quantity.min((adjusted - position).max(0.0));
            }
        }
        if let Some(cap) = capacity {
            quantity = quantity.min(cap);
        }
        quantity.max(0.0)
    }
}
