//! In-memory venue.
//!
//! Serves a configurable book, keeps resting orders in a map, and records
//! the most recent mutating calls in a bounded log. Failures can be scripted per operation, either as a
//! ready [`VenueError`] or as raw venue text run through an
//! [`ErrorClassifier`]. Used as the test double across the workspace and as
//! the backend of paper mode.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use dmm_core::{OrderBookSnapshot, OrderId, OrderSide, Price, Size, Trade};
use parking_lot::Mutex;
use rust_decimal::Decimal;
use tracing::debug;

use crate::classifier::ErrorClassifier;
use crate::error::{GatewayResult, VenueError};
use crate::gateway::{BoxFuture, VenueGateway};

/// Recorded calls kept before the oldest are dropped.
pub const CALL_LOG_CAPACITY: usize = 1024;

/// Gateway operation, used to target scripted failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Ticker,
    OrderBook,
    Balance,
    Position,
    Place,
    Edit,
    Cancel,
    Trades,
}

/// A mutating or history call observed by the mock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayCall {
    Place {
        side: OrderSide,
        amount: Size,
        price: Price,
    },
    Edit {
        order_id: OrderId,
        side: OrderSide,
        amount: Size,
        price: Price,
    },
    Cancel {
        order_id: OrderId,
    },
    FetchTrades {
        since_ms: i64,
    },
}

/// An order the mock considers resting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestingOrder {
    pub side: OrderSide,
    pub amount: Size,
    pub price: Price,
}

#[derive(Debug, Default)]
struct MockState {
    last_price: Option<Price>,
    book: OrderBookSnapshot,
    quote_balance: Decimal,
    position: Option<Decimal>,
    resting: HashMap<OrderId, RestingOrder>,
    trades: Vec<Trade>,
    failures: HashMap<Operation, VecDeque<VenueError>>,
    calls: VecDeque<GatewayCall>,
    counts: CallCounts,
}

/// Totals since the last [`MockGateway::clear_calls`], unaffected by log eviction.
#[derive(Debug, Default)]
struct CallCounts {
    buy_places: usize,
    sell_places: usize,
    edits: usize,
    cancels: usize,
}

impl MockState {
    fn record(&mut self, call: GatewayCall) {
        match &call {
            GatewayCall::Place { side: OrderSide::Buy, .. } => self.counts.buy_places += 1,
            GatewayCall::Place { side: OrderSide::Sell, .. } => self.counts.sell_places += 1,
            GatewayCall::Edit { .. } => self.counts.edits += 1,
            GatewayCall::Cancel { .. } => self.counts.cancels += 1,
            GatewayCall::FetchTrades { .. } => {}
        }
        if self.calls.len() == CALL_LOG_CAPACITY {
            self.calls.pop_front();
        }
        self.calls.push_back(call);
    }
}

/// Scriptable in-memory venue.
#[derive(Debug)]
pub struct MockGateway {
    state: Mutex<MockState>,
    supports_edit: AtomicBool,
    next_order_id: AtomicU64,
    classifier: ErrorClassifier,
}

impl Default for MockGateway {
    fn default() -> Self {
        Self::new()
    }
}

impl MockGateway {
    /// Empty venue with edit support and the default error table.
    pub fn new() -> Self {
        Self::with_classifier(ErrorClassifier::default())
    }

    pub fn with_classifier(classifier: ErrorClassifier) -> Self {
        Self {
            state: Mutex::new(MockState::default()),
            supports_edit: AtomicBool::new(true),
            next_order_id: AtomicU64::new(1),
            classifier,
        }
    }

    pub fn set_book(&self, book: OrderBookSnapshot) {
        self.state.lock().book = book;
    }

    pub fn set_last_price(&self, price: Option<Price>) {
        self.state.lock().last_price = price;
    }

    pub fn set_quote_balance(&self, balance: Decimal) {
        self.state.lock().quote_balance = balance;
    }

    pub fn set_position(&self, position: Option<Decimal>) {
        self.state.lock().position = position;
    }

    pub fn set_supports_edit(&self, supported: bool) {
        self.supports_edit.store(supported, Ordering::SeqCst);
    }

    /// Append a fill to the account's trade history.
    pub fn push_trade(&self, trade: Trade) {
        self.state.lock().trades.push(trade);
    }

    /// Make the next call of `op` fail with `error`. Failures queue up in order.
    pub fn fail_next(&self, op: Operation, error: VenueError) {
        self.state
            .lock()
            .failures
            .entry(op)
            .or_default()
            .push_back(error);
    }

    /// Like [`fail_next`](Self::fail_next), but from raw venue text.
    pub fn fail_next_raw(&self, op: Operation, raw: &str) {
        let error = self.classifier.error(raw);
        self.fail_next(op, error);
    }

    /// Put an order on the book without going through `place_limit_order`.
    pub fn seed_resting(&self, order_id: OrderId, order: RestingOrder) {
        self.state.lock().resting.insert(order_id, order);
    }

    /// Drop a resting order as if it had been filled or expired venue-side.
    pub fn remove_resting(&self, order_id: &OrderId) -> Option<RestingOrder> {
        self.state.lock().resting.remove(order_id)
    }

    pub fn resting(&self, order_id: &OrderId) -> Option<RestingOrder> {
        self.state.lock().resting.get(order_id).cloned()
    }

    pub fn resting_count(&self) -> usize {
        self.state.lock().resting.len()
    }

    /// Most recent recorded calls, oldest first. At most [`CALL_LOG_CAPACITY`].
    pub fn calls(&self) -> Vec<GatewayCall> {
        self.state.lock().calls.iter().cloned().collect()
    }

    /// Empty the call log and reset the call counters.
    pub fn clear_calls(&self) {
        let mut state = self.state.lock();
        state.calls.clear();
        state.counts = CallCounts::default();
    }

    /// Number of placement attempts on `side`, failed ones included.
    pub fn place_count(&self, side: OrderSide) -> usize {
        let state = self.state.lock();
        match side {
            OrderSide::Buy => state.counts.buy_places,
            OrderSide::Sell => state.counts.sell_places,
        }
    }

    pub fn cancel_count(&self) -> usize {
        self.state.lock().counts.cancels
    }

    pub fn edit_count(&self) -> usize {
        self.state.lock().counts.edits
    }

    fn take_failure(state: &mut MockState, op: Operation) -> Option<VenueError> {
        state.failures.get_mut(&op).and_then(VecDeque::pop_front)
    }

    fn read<T>(&self, op: Operation, f: impl FnOnce(&MockState) -> T) -> GatewayResult<T> {
        let mut state = self.state.lock();
        if let Some(err) = Self::take_failure(&mut state, op) {
            return Err(err);
        }
        Ok(f(&state))
    }

    fn do_place(&self, side: OrderSide, amount: Size, price: Price) -> GatewayResult<OrderId> {
        let mut state = self.state.lock();
        state.record(GatewayCall::Place {
            side,
            amount,
            price,
        });
        if let Some(err) = Self::take_failure(&mut state, Operation::Place) {
            return Err(err);
        }
        let n = self.next_order_id.fetch_add(1, Ordering::SeqCst);
        let order_id = OrderId::new(format!("paper-{n}"));
        state.resting.insert(
            order_id.clone(),
            RestingOrder {
                side,
                amount,
                price,
            },
        );
        debug!(order_id = %order_id, side = %side, amount = %amount, price = %price, "mock place");
        Ok(order_id)
    }

    fn do_edit(
        &self,
        order_id: &OrderId,
        side: OrderSide,
        amount: Size,
        price: Price,
    ) -> GatewayResult<()> {
        let mut state = self.state.lock();
        state.record(GatewayCall::Edit {
            order_id: order_id.clone(),
            side,
            amount,
            price,
        });
        if let Some(err) = Self::take_failure(&mut state, Operation::Edit) {
            return Err(err);
        }
        if !self.supports_edit.load(Ordering::SeqCst) {
            return Err(self.classifier.error("editOrder is not supported"));
        }
        let classifier = &self.classifier;
        match state.resting.get_mut(order_id) {
            None => Err(classifier.error(format!("order not found: {order_id}"))),
            Some(order) if order.amount == amount && order.price == price => {
                Err(classifier.error("order not modified: no change"))
            }
            Some(order) => {
                order.side = side;
                order.amount = amount;
                order.price = price;
                Ok(())
            }
        }
    }

    fn do_cancel(&self, order_id: &OrderId) -> GatewayResult<()> {
        let mut state = self.state.lock();
        state.record(GatewayCall::Cancel {
            order_id: order_id.clone(),
        });
        if let Some(err) = Self::take_failure(&mut state, Operation::Cancel) {
            return Err(err);
        }
        match state.resting.remove(order_id) {
            Some(_) => Ok(()),
            None => Err(self.classifier.error(format!("order not found: {order_id}"))),
        }
    }

    fn do_fetch_trades(&self, since_ms: i64) -> GatewayResult<Vec<Trade>> {
        let mut state = self.state.lock();
        state.record(GatewayCall::FetchTrades { since_ms });
        if let Some(err) = Self::take_failure(&mut state, Operation::Trades) {
            return Err(err);
        }
        let mut trades: Vec<Trade> = state
            .trades
            .iter()
            .filter(|t| t.timestamp_ms >= since_ms)
            .cloned()
            .collect();
        trades.sort_by_key(|t| t.timestamp_ms);
        Ok(trades)
    }
}

impl VenueGateway for MockGateway {
    fn fetch_ticker(&self) -> BoxFuture<'_, GatewayResult<Option<Price>>> {
        let result = self.read(Operation::Ticker, |s| s.last_price);
        Box::pin(async move { result })
    }

    fn fetch_order_book(&self) -> BoxFuture<'_, GatewayResult<OrderBookSnapshot>> {
        let result = self.read(Operation::OrderBook, |s| s.book.clone());
        Box::pin(async move { result })
    }

    fn fetch_quote_balance(&self) -> BoxFuture<'_, GatewayResult<Decimal>> {
        let result = self.read(Operation::Balance, |s| s.quote_balance);
        Box::pin(async move { result })
    }

    fn fetch_position(&self) -> BoxFuture<'_, GatewayResult<Option<Decimal>>> {
        let result = self.read(Operation::Position, |s| s.position);
        Box::pin(async move { result })
    }

    fn place_limit_order(
        &self,
        side: OrderSide,
        amount: Size,
        price: Price,
    ) -> BoxFuture<'_, GatewayResult<OrderId>> {
        Box::pin(async move { self.do_place(side, amount, price) })
    }

    fn edit_order<'a>(
        &'a self,
        order_id: &'a OrderId,
        side: OrderSide,
        amount: Size,
        price: Price,
    ) -> BoxFuture<'a, GatewayResult<()>> {
        Box::pin(async move { self.do_edit(order_id, side, amount, price) })
    }

    fn cancel_order<'a>(&'a self, order_id: &'a OrderId) -> BoxFuture<'a, GatewayResult<()>> {
        Box::pin(async move { self.do_cancel(order_id) })
    }

    fn fetch_trades_since(&self, since_ms: i64) -> BoxFuture<'_, GatewayResult<Vec<Trade>>> {
        Box::pin(async move { self.do_fetch_trades(since_ms) })
    }

    fn supports_edit(&self) -> bool {
        self.supports_edit.load(Ordering::SeqCst)
    }
}
