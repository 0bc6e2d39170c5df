//! Connection Handler: drives one client through handshake, request and relay.

use std::fmt;

use log::{debug, info};
use tokio::io::{AsyncRead, AsyncWrite};

use crate::error::{Result, SocksError};
use crate::handshake;
use crate::relay::{self, RelayStats};
use crate::request::{self, ConnectRequest};

/// Where a session stands. Every failure moves straight to `Closed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Init,
    Handshaken,
    Connecting,
    Relaying,
    Closed,
}

pub struct Session<S> {
    stream: S,
    peer: String,
    phase: Phase,
}

impl<S> Session<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub fn new(stream: S, peer: impl fmt::Display) -> Self {
        Self {
            stream,
            peer: peer.to_string(),
            phase: Phase::Init,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Init -> Handshaken
    pub async fn handshake(&mut self) -> Result<()> {
        self.expect(Phase::Init, "handshake")?;
        let outcome = handshake::negotiate(&mut self.stream).await;
        self.settle(outcome, Phase::Handshaken)
    }

    /// Handshaken -> Connecting
    pub async fn read_request(&mut self) -> Result<ConnectRequest> {
        self.expect(Phase::Handshaken, "request")?;
        let outcome = request::read_request(&mut self.stream).await;
        self.settle(outcome, Phase::Connecting)
    }

    /// Connecting -> Relaying -> Closed
    pub async fn relay(mut self, request: &ConnectRequest) -> Result<RelayStats> {
        self.expect(Phase::Connecting, "relay")?;
        let outcome = relay::establish(&mut self.stream, request).await;
        let target = self.settle(outcome, Phase::Relaying)?;
        info!(
            "{}: connected to {}:{}",
            self.peer, request.address, request.port
        );

        let outcome = relay::relay(self.stream, target).await;
        debug!("{}: {:?} -> {:?}", self.peer, self.phase, Phase::Closed);
        outcome
    }

    /// Run every phase in order.
    pub async fn run(mut self) -> Result<RelayStats> {
        self.handshake().await?;
        info!("{}: handshake success", self.peer);

        let request = self.read_request().await?;
        info!(
            "{}: connect request for {}:{}",
            self.peer, request.address, request.port
        );

        self.relay(&request).await
    }

    fn expect(&self, phase: Phase, operation: &'static str) -> Result<()> {
        if self.phase != phase {
            return Err(SocksError::OutOfOrder {
                operation,
                phase: self.phase,
            });
        }
        Ok(())
    }

    fn settle<T>(&mut self, outcome: Result<T>, next: Phase) -> Result<T> {
        let next = if outcome.is_ok() { next } else { Phase::Closed };
        debug!("{}: {:?} -> {:?}", self.peer, self.phase, next);
        self.phase = next;
        outcome
    }
}
