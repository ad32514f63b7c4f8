#[cfg(test)]
mod tests {
    use crate::{Codec, CodecError, DecodeFailure, TypePair};
    use serde::{Deserialize, Serialize};

    #[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
    struct Record {
        key: String,
        value: Vec<u64>,
    }

    fn record() -> Record {
        Record {
            key: "alpha".into(),
            value: vec![1, 2, 3, 500, 70_000],
        }
    }

    fn codec() -> Codec {
        Codec::with_pairs([TypePair::of::<Record>("record")])
    }

    #[test]
    fn every_truncation_fails_to_decode() {
        let mut ctx = codec().context();
        let bytes = ctx.serialize(&record()).unwrap();
        for cut in 0..bytes.len() {
            let err = ctx.deserialize(&bytes[..cut]).unwrap_err();
            assert!(
                matches!(err, CodecError::Decode { len, .. } if len == cut),
                "cut at {cut}: {err:?}"
            );
            assert!(ctx.deserialize_as::<Record>(&bytes[..cut]).is_err());
        }
    }

    #[test]
    fn unknown_registration_id_fails() {
        let mut ctx = codec().context();
        let mut bytes = ctx.serialize(&record()).unwrap();
        // [variant, id, ...]
        bytes[1] = 42;
        let err = ctx.deserialize(&bytes).unwrap_err();
        assert!(matches!(
            err,
            CodecError::Decode {
                source: DecodeFailure::UnknownId(42),
                ..
            }
        ));
    }

    #[test]
    fn unknown_tag_variant_fails() {
        let mut ctx = codec().context();
        let mut bytes = ctx.serialize(&record()).unwrap();
        bytes[0] = 9;
        assert!(matches!(
            ctx.deserialize(&bytes).unwrap_err(),
            CodecError::Decode {
                source: DecodeFailure::Bincode(_),
                ..
            }
        ));
    }

    #[test]
    fn garbage_after_a_value_is_rejected() {
        let mut ctx = codec().context();
        let mut bytes = ctx.serialize(&record()).unwrap();
        bytes.extend_from_slice(&[0xde, 0xad]);
        assert!(matches!(
            ctx.deserialize(&bytes).unwrap_err(),
            CodecError::Decode {
                source: DecodeFailure::TrailingBytes(2),
                ..
            }
        ));
    }

    #[test]
    fn corrupt_string_payload_fails() {
        let mut ctx = codec().context();
        let mut bytes = ctx.serialize(&record()).unwrap();
        // tag (2), key length (1), then "alpha"
        bytes[3] = 0xff;
        assert!(ctx.deserialize(&bytes).is_err());
    }

    #[test]
    fn huge_length_prefix_fails_without_allocating() {
        let mut ctx = codec().context();
        // registered id 0, then a u64 varint claiming a 1 PiB string
        let mut bytes = vec![0, 0, 253];
        bytes.extend_from_slice(&(1u64 << 50).to_le_bytes());

        assert!(matches!(
            ctx.deserialize(&bytes).unwrap_err(),
            CodecError::Decode {
                source: DecodeFailure::Bincode(_),
                ..
            }
        ));
        assert!(ctx.deserialize_as::<Record>(&bytes).is_err());
    }

    #[test]
    fn huge_type_name_fails_without_allocating() {
        let mut ctx = codec().context();
        // `Named` tag whose name claims 1 PiB
        let mut bytes = vec![1, 253];
        bytes.extend_from_slice(&(1u64 << 50).to_le_bytes());
        assert!(matches!(ctx.deserialize(&bytes).unwrap_err(), CodecError::Decode { .. }));
    }
}
