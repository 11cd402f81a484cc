//! Per-side order reconciliation.
//!
//! Moves the venue from the currently tracked order towards the planned
//! target with as few calls as possible: edit in place when the venue allows
//! it, cancel+create otherwise. Tracked state is passed in and handed back
//! in [`Reconciled`]; the reconciler itself holds no order state.

use dmm_core::{OrderId, OrderSide, Size};
use dmm_gateway::{ErrorKind, VenueError, VenueGateway};
use tracing::{debug, info, warn};

use crate::config::PricingConfig;
use crate::planner::TargetQuote;

/// Order we believe is resting on one side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackedOrder {
    pub side: OrderSide,
    pub order_id: Option<OrderId>,
}

impl TrackedOrder {
    pub fn untracked(side: OrderSide) -> Self {
        Self {
            side,
            order_id: None,
        }
    }

    pub fn resting(side: OrderSide, order_id: OrderId) -> Self {
        Self {
            side,
            order_id: Some(order_id),
        }
    }

    #[inline]
    pub fn is_resting(&self) -> bool {
        self.order_id.is_some()
    }
}

/// What the reconciler did on one side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileAction {
    /// Nothing to do.
    Idle,
    /// Fresh order placed.
    Placed(OrderId),
    /// Placement rejected; side stays untracked.
    PlaceFailed(ErrorKind),
    /// Resting order amended in place.
    Edited(OrderId),
    /// Venue reported the amendment as a no-op.
    Unchanged(OrderId),
    /// Resting order cancelled with no replacement.
    Cancelled(OrderId),
    /// Edit path abandoned: previous order dropped, replacement attempted.
    Replaced {
        previous: OrderId,
        placed: Option<OrderId>,
    },
}

/// Outcome of one reconciliation: new tracked state plus what happened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciled {
    pub order: TrackedOrder,
    pub action: ReconcileAction,
}

impl Reconciled {
    fn new(order: TrackedOrder, action: ReconcileAction) -> Self {
        Self { order, action }
    }
}

/// Drives one side of the book towards its target.
#[derive(Debug, Clone)]
pub struct OrderReconciler {
    min_amount: Size,
}

impl OrderReconciler {
    pub fn new(min_amount: Size) -> Self {
        Self { min_amount }
    }

    pub fn from_config(config: &PricingConfig) -> Self {
        Self::new(config.min_size())
    }

    /// Reconcile `tracked` against `target`.
    ///
    /// Recoverable venue errors are absorbed here. `Err` is returned only
    /// for [`ErrorKind::Fatal`]; the caller should then keep its previous
    /// tracked state and stop quoting. At most one placement is attempted.
    pub async fn reconcile(
        &self,
        gateway: &dyn VenueGateway,
        tracked: &TrackedOrder,
        target: &TargetQuote,
    ) -> Result<Reconciled, VenueError> {
        let side = tracked.side;
        let wants_order = target.should_place && target.amount >= self.min_amount;

        let Some(order_id) = tracked.order_id.clone() else {
            if !wants_order {
                return Ok(Reconciled::new(tracked.clone(), ReconcileAction::Idle));
            }
            return self.place(gateway, target).await;
        };

        if !wants_order {
            cancel_quietly(gateway, &order_id).await?;
            info!(side = %side, order_id = %order_id, "Quote withdrawn");
            return Ok(Reconciled::new(
                TrackedOrder::untracked(side),
                ReconcileAction::Cancelled(order_id),
            ));
        }

        if gateway.supports_edit() {
            match gateway
                .edit_order(&order_id, side, target.amount, target.price)
                .await
            {
                Ok(()) => {
                    debug!(side = %side, order_id = %order_id, price = %target.price, amount = %target.amount, "Quote edited");
                    return Ok(Reconciled::new(
                        TrackedOrder::resting(side, order_id.clone()),
                        ReconcileAction::Edited(order_id),
                    ));
                }
                Err(e) => match e.kind {
                    ErrorKind::NoOpUnchanged => {
                        return Ok(Reconciled::new(
                            TrackedOrder::resting(side, order_id.clone()),
                            ReconcileAction::Unchanged(order_id),
                        ));
                    }
                    ErrorKind::NotFound => {
                        debug!(side = %side, order_id = %order_id, "Tracked order gone, replacing");
                    }
                    ErrorKind::Fatal => return Err(e),
                    _ => {
                        warn!(side = %side, order_id = %order_id, error = %e, "Edit failed, falling back to cancel+create");
                        cancel_quietly(gateway, &order_id).await?;
                    }
                },
            }
        } else {
            cancel_quietly(gateway, &order_id).await?;
        }

        let placed = self.place(gateway, target).await?;
        let new_id = placed.order.order_id.clone();
        Ok(Reconciled::new(
            placed.order,
            ReconcileAction::Replaced {
                previous: order_id,
                placed: new_id,
            },
        ))
    }

    async fn place(
        &self,
        gateway: &dyn VenueGateway,
        target: &TargetQuote,
    ) -> Result<Reconciled, VenueError> {
        let side = target.side;
        match gateway
            .place_limit_order(side, target.amount, target.price)
            .await
        {
            Ok(order_id) => {
                info!(side = %side, order_id = %order_id, price = %target.price, amount = %target.amount, "Quote placed");
                Ok(Reconciled::new(
                    TrackedOrder::resting(side, order_id.clone()),
                    ReconcileAction::Placed(order_id),
                ))
            }
            Err(e) if e.is_fatal() => Err(e),
            Err(e) => {
                warn!(side = %side, price = %target.price, amount = %target.amount, error = %e, "Quote placement failed");
                Ok(Reconciled::new(
                    TrackedOrder::untracked(side),
                    ReconcileAction::PlaceFailed(e.kind),
                ))
            }
        }
    }
}

/// Cancel, treating an already-gone order as success.
///
/// Non-fatal failures are logged and swallowed; the id is dropped either way.
pub async fn cancel_quietly(
    gateway: &dyn VenueGateway,
    order_id: &OrderId,
) -> Result<(), VenueError> {
    match gateway.cancel_order(order_id).await {
        Ok(()) => Ok(()),
        Err(e) if e.is(ErrorKind::NotFound) => {
            debug!(order_id = %order_id, "Cancel target already gone");
            Ok(())
        }
        Err(e) if e.is_fatal() => Err(e),
        Err(e) => {
            warn!(order_id = %order_id, error = %e, "Cancel failed, dropping order from tracking");
            Ok(())
        }
    }
}
