use bytes::BytesMut;

use crate::protocol::{REPLY_CODE_OFFSET, ReplyCode};

/// A reply built by echoing the request and overwriting REP.
///
/// BND.ADDR and BND.PORT are never computed; the client gets its own
/// DST.ADDR/DST.PORT back, so a reply is always as long as its request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    buf: BytesMut,
}

impl Reply {
    pub fn from_request(raw: &[u8]) -> Self {
        Self {
            buf: BytesMut::from(raw),
        }
    }

    pub fn with_code(mut self, code: ReplyCode) -> Self {
        if let Some(rep) = self.buf.get_mut(REPLY_CODE_OFFSET) {
            *rep = code.into();
        }
        self
    }

    pub fn code(&self) -> Option<u8> {
        self.buf.get(REPLY_CODE_OFFSET).copied()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn echoes_request_with_new_code() {
        let request = [0x05, 0x02, 0x00, 0x01, 10, 0, 0, 1, 0x1f, 0x90];
        let reply = Reply::from_request(&request).with_code(ReplyCode::CommandNotSupported);

        assert_eq!(reply.len(), request.len());
        assert_eq!(reply.code(), Some(0x07));
        assert_eq!(&reply.as_bytes()[2..], &request[2..]);
    }

    #[test]
    fn last_code_wins() {
        let reply = Reply::from_request(&[0x05, 0x01, 0x00, 0x01])
            .with_code(ReplyCode::GeneralFailure)
            .with_code(ReplyCode::Succeeded);
        assert_eq!(reply.as_bytes(), &[0x05, 0x00, 0x00, 0x01]);
    }
}
