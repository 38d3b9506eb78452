//! MongoDB message header and opcodes

use bytes::{Buf, BufMut, BytesMut};
use mongowire_common::{MongoError, MongoResult};

/// Size of the standard message header
pub const HEADER_LENGTH: usize = 16;

/// MongoDB wire protocol opcodes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum OpCode {
    Reply = 1,
    Update = 2001,
    Insert = 2002,
    Query = 2004,
    GetMore = 2005,
    Delete = 2006,
    KillCursors = 2007,
    Compressed = 2012,
    Msg = 2013,
}

impl TryFrom<i32> for OpCode {
    type Error = MongoError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(OpCode::Reply),
            2001 => Ok(OpCode::Update),
            2002 => Ok(OpCode::Insert),
            2004 => Ok(OpCode::Query),
            2005 => Ok(OpCode::GetMore),
            2006 => Ok(OpCode::Delete),
            2007 => Ok(OpCode::KillCursors),
            2012 => Ok(OpCode::Compressed),
            2013 => Ok(OpCode::Msg),
            other => Err(MongoError::failed_to_parse(format!("unknown opcode {other}"))),
        }
    }
}

/// Message header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MsgHeader {
    pub message_length: i32,
    pub request_id: i32,
    pub response_to: i32,
    pub op_code: OpCode,
}

/// Parse a message header
pub fn parse_header(data: &[u8]) -> MongoResult<MsgHeader> {
    if data.len() < HEADER_LENGTH {
        return Err(MongoError::failed_to_parse(format!(
            "message header too short: {} bytes",
            data.len()
        )));
    }

    let mut buf = &data[..HEADER_LENGTH];
    let message_length = buf.get_i32_le();
    let request_id = buf.get_i32_le();
    let response_to = buf.get_i32_le();
    let op_code = OpCode::try_from(buf.get_i32_le())?;

    Ok(MsgHeader {
        message_length,
        request_id,
        response_to,
        op_code,
    })
}

/// Serialize a message header
pub fn serialize_header(header: &MsgHeader, buf: &mut BytesMut) {
    buf.put_i32_le(header.message_length);
    buf.put_i32_le(header.request_id);
    buf.put_i32_le(header.response_to);
    buf.put_i32_le(header.op_code as i32);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_round_trip() {
        let header = MsgHeader {
            message_length: 36,
            request_id: 7,
            response_to: 3,
            op_code: OpCode::Reply,
        };
        let mut buf = BytesMut::new();
        serialize_header(&header, &mut buf);
        assert_eq!(buf.len(), HEADER_LENGTH);
        assert_eq!(&buf[12..16], &1_i32.to_le_bytes());
        assert_eq!(parse_header(&buf).unwrap(), header);
    }

    #[test]
    fn test_rejects_short_and_unknown() {
        assert!(parse_header(&[0u8; 8]).is_err());

        let mut buf = BytesMut::new();
        buf.put_i32_le(16);
        buf.put_i32_le(1);
        buf.put_i32_le(0);
        buf.put_i32_le(9999);
        let err = parse_header(&buf).unwrap_err();
        assert_eq!(err, MongoError::failed_to_parse("unknown opcode 9999"));
    }
}
