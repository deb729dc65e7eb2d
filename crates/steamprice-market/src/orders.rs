//! Buy-order lookups through a privileged collaborator
//!
//! Buy-order pages require an authenticated session, so these lookups go
//! through a message channel to whatever process holds one. The client
//! sends a query and waits for a single reply. Every failure collapses
//! into one coarse error; the responder reports nothing finer.

use async_trait::async_trait;
use std::fmt::Debug;
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};

use crate::source::Cents;

/// The single failure reason a buy-order lookup can produce
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("error")]
pub struct OrderError;

/// One buy-order question
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderQuery {
    pub app_id: u32,
    pub currency_id: u32,
    pub market_hash_name: String,
}

/// A query plus the slot its answer goes into
#[derive(Debug)]
pub struct OrderRequest {
    pub query: OrderQuery,
    pub reply: oneshot::Sender<Result<Cents, OrderError>>,
}

/// Answers buy-order questions
#[async_trait]
pub trait OrderBook: Send + Sync + Debug {
    /// Highest buy order currently standing, in cents
    async fn highest_buy_order(&self, query: OrderQuery) -> Result<Cents, OrderError>;
}

/// Receiving half, handed to the privileged responder
pub type OrderReceiver = mpsc::Receiver<OrderRequest>;

/// Client half of the order channel
#[derive(Debug, Clone)]
pub struct ChannelOrderBook {
    tx: mpsc::Sender<OrderRequest>,
}

/// Create a connected order channel. The responder drains the receiver and
/// answers each request through its reply slot; a dropped reply slot or a
/// closed channel reads as a failed lookup on the client side.
pub fn order_channel(buffer: usize) -> (ChannelOrderBook, OrderReceiver) {
    let (tx, rx) = mpsc::channel(buffer);
    (ChannelOrderBook { tx }, rx)
}

#[async_trait]
impl OrderBook for ChannelOrderBook {
    async fn highest_buy_order(&self, query: OrderQuery) -> Result<Cents, OrderError> {
        let (reply, answer) = oneshot::channel();
        self.tx
            .send(OrderRequest { query, reply })
            .await
            .map_err(|_| OrderError)?;
        answer.await.map_err(|_| OrderError)?
    }
}

/// Stand-in for runs without a privileged session; every lookup fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnavailableOrders;

#[async_trait]
impl OrderBook for UnavailableOrders {
    async fn highest_buy_order(&self, _query: OrderQuery) -> Result<Cents, OrderError> {
        Err(OrderError)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(market_hash_name: &str) -> OrderQuery {
        OrderQuery {
            app_id: 730,
            currency_id: 1,
            market_hash_name: market_hash_name.to_string(),
        }
    }

    #[tokio::test]
    async fn round_trip_through_a_responder() {
        let (orders, mut rx) = order_channel(4);

        let responder = tokio::spawn(async move {
            while let Some(request) = rx.recv().await {
                let answer = if request.query.market_hash_name == "AK-47 | Redline (Field-Tested)" {
                    Ok(1234)
                } else {
                    Err(OrderError)
                };
                let _ = request.reply.send(answer);
            }
        });

        assert_eq!(
            orders
                .highest_buy_order(query("AK-47 | Redline (Field-Tested)"))
                .await,
            Ok(1234)
        );
        assert_eq!(
            orders.highest_buy_order(query("Unknown Item")).await,
            Err(OrderError)
        );

        drop(orders);
        responder.await.unwrap();
    }

    #[tokio::test]
    async fn missing_responder_reads_as_failure() {
        let (orders, rx) = order_channel(1);
        drop(rx);

        assert_eq!(
            orders.highest_buy_order(query("anything")).await,
            Err(OrderError)
        );
    }

    #[tokio::test]
    async fn dropped_reply_slot_reads_as_failure() {
        let (orders, mut rx) = order_channel(1);

        tokio::spawn(async move {
            if let Some(request) = rx.recv().await {
                drop(request.reply);
            }
        });

        assert_eq!(
            orders.highest_buy_order(query("anything")).await,
            Err(OrderError)
        );
    }

    #[tokio::test]
    async fn unavailable_orders_always_fail() {
        let orders = UnavailableOrders;
        assert_eq!(
            orders.highest_buy_order(query("anything")).await,
            Err(OrderError)
        );
    }
}
