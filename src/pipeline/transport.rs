//! Typed endpoints for the two kinds of edge in the chain.
//!
//! Each logical edge gets its own crossbeam channel instead of sharing one
//! channel distinguished by tags. Data edges carry the 40-byte little-endian
//! encoding of each message, so every hop goes through the codec. A capacity of `0` makes every send a
//! rendezvous with the matching receive, which keeps the chain in lockstep.
//!
//! Endpoints remember which stage owns them so that failures can name the
//! stage and the operation. A send or receive fails only when the peer has
//! dropped its end, i.e. the peer stage has already failed.

use crate::pipeline::error::{PipelineError, PipelineResult};
use crate::pipeline::id::{EdgeKind, StageId};
use crate::pipeline::message::{PipelineMessage, ACK_TOKEN, WIRE_BYTES};
use crossbeam_channel::{bounded, Receiver, Sender};

/// Sending half of a data edge, owned by the upstream stage.
pub struct DataSender {
    stage: StageId,
    tx: Sender<[u8; WIRE_BYTES]>,
}

impl DataSender {
    pub fn send(&self, msg: &PipelineMessage) -> PipelineResult<()> {
        self.tx.send(msg.to_bytes()).map_err(|_| PipelineError::Send {
            stage: self.stage,
            edge: EdgeKind::Data,
        })
    }

    pub fn stage(&self) -> StageId {
        self.stage
    }
}

/// Receiving half of a data edge, owned by the downstream stage.
pub struct DataReceiver {
    stage: StageId,
    rx: Receiver<[u8; WIRE_BYTES]>,
}

impl DataReceiver {
    /// Block until the predecessor sends the next message.
    pub fn recv(&self) -> PipelineResult<PipelineMessage> {
        let frame = self.rx.recv().map_err(|_| PipelineError::Recv {
            stage: self.stage,
            edge: EdgeKind::Data,
        })?;
        PipelineMessage::from_bytes(&frame)
    }
}

/// Sink side of the acknowledgment edge.
pub struct AckSender {
    stage: StageId,
    tx: Sender<i64>,
}

impl AckSender {
    pub fn send(&self) -> PipelineResult<()> {
        self.tx.send(ACK_TOKEN).map_err(|_| PipelineError::Send {
            stage: self.stage,
            edge: EdgeKind::Ack,
        })
    }
}

/// Source side of the acknowledgment edge.
pub struct AckReceiver {
    stage: StageId,
    rx: Receiver<i64>,
}

impl AckReceiver {
    /// Block until the sink acknowledges the end of the stream.
    pub fn recv(&self) -> PipelineResult<()> {
        let token = self.rx.recv().map_err(|_| PipelineError::Recv {
            stage: self.stage,
            edge: EdgeKind::Ack,
        })?;
        if token != ACK_TOKEN {
            return Err(PipelineError::ProtocolViolation {
                stage: self.stage,
                message: format!("unexpected acknowledgment token {token}"),
            });
        }
        Ok(())
    }
}

/// Create the data edge `from → to`.
pub fn data_edge(from: StageId, to: StageId, capacity: usize) -> (DataSender, DataReceiver) {
    let (tx, rx) = bounded(capacity);
    (
        DataSender { stage: from, tx },
        DataReceiver { stage: to, rx },
    )
}

/// Create the acknowledgment edge `sink → source`.
pub fn ack_edge(sink: StageId, source: StageId, capacity: usize) -> (AckSender, AckReceiver) {
    let (tx, rx) = bounded(capacity);
    (
        AckSender { stage: sink, tx },
        AckReceiver { stage: source, rx },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_data_edge_preserves_order() {
        let (tx, rx) = data_edge(StageId(0), StageId(1), 4);
        for v in 1..=3 {
            tx.send(&PipelineMessage::element(v)).unwrap();
        }
        tx.send(&PipelineMessage::sentinel()).unwrap();

        let received: Vec<_> = (0..4).map(|_| rx.recv().unwrap()).collect();
        assert_eq!(received[0].value, 1);
        assert_eq!(received[2].value, 3);
        assert!(received[3].is_end);
    }

    #[test]
    fn test_rendezvous_edge_between_threads() {
        let (tx, rx) = data_edge(StageId(0), StageId(1), 0);
        let handle = thread::spawn(move || tx.send(&PipelineMessage::element(42)));
        assert_eq!(rx.recv().unwrap().value, 42);
        handle.join().unwrap().unwrap();
    }

    #[test]
    fn test_recv_fails_when_sender_dropped() {
        let (tx, rx) = data_edge(StageId(2), StageId(3), 0);
        drop(tx);
        match rx.recv() {
            Err(PipelineError::Recv { stage, edge }) => {
                assert_eq!(stage, StageId(3));
                assert_eq!(edge, EdgeKind::Data);
            }
            other => panic!("expected receive error, got {other:?}"),
        }
    }

    #[test]
    fn test_send_fails_when_receiver_dropped() {
        let (tx, rx) = data_edge(StageId(1), StageId(2), 0);
        drop(rx);
        assert!(matches!(
            tx.send(&PipelineMessage::sentinel()),
            Err(PipelineError::Send { .. })
        ));
    }

    #[test]
    fn test_recv_rejects_corrupt_frame() {
        let (tx, rx) = bounded(1);
        let receiver = DataReceiver { stage: StageId(1), rx };
        let mut bytes = PipelineMessage::sentinel().to_bytes();
        bytes[WIRE_BYTES - 8] = 7;
        tx.send(bytes).unwrap();
        assert!(matches!(receiver.recv(), Err(PipelineError::Decode(_))));
    }

    #[test]
    fn test_ack_round_trip() {
        let (tx, rx) = ack_edge(StageId(3), StageId::SOURCE, 1);
        tx.send().unwrap();
        rx.recv().unwrap();
    }
}
