use gannet_wire::{
    CommandId, Datum, Message, Request, RequestHeader, Response, ResponseHeader, Row,
    ServerError, StatementResult,
};
use proptest::prelude::*;

fn datum_strategy() -> impl Strategy<Value = Datum> {
    prop_oneof![
        Just(Datum::Null),
        any::<bool>().prop_map(Datum::Bool),
        any::<i64>().prop_map(Datum::Int),
        // Finite floats only; NaN breaks equality, and bit-exactness of
        // special values is covered by unit tests.
        (-1.0e300f64..1.0e300).prop_map(Datum::Float),
        prop::collection::vec(any::<u8>(), 0..64).prop_map(Datum::Bytes),
        any::<String>().prop_map(Datum::Text),
    ]
}

fn command_id_strategy() -> impl Strategy<Value = CommandId> {
    (any::<i64>(), any::<i64>()).prop_map(|(wall_time, random)| CommandId { wall_time, random })
}

fn row_strategy() -> impl Strategy<Value = Row> {
    prop::collection::vec(datum_strategy(), 0..8).prop_map(|values| Row { values })
}

fn result_strategy() -> impl Strategy<Value = StatementResult> {
    (
        prop::collection::vec(any::<String>(), 0..4),
        prop::collection::vec(row_strategy(), 0..4),
    )
        .prop_map(|(columns, rows)| StatementResult { columns, rows })
}

fn request_strategy() -> impl Strategy<Value = Request> {
    (
        prop::collection::vec(any::<u8>(), 0..32),
        prop::collection::vec(any::<u8>(), 0..32),
        command_id_strategy(),
        any::<String>(),
        any::<String>(),
        prop::collection::vec(datum_strategy(), 0..8),
    )
        .prop_map(|(session, txn, command_id, user, sql, params)| Request {
            header: RequestHeader {
                session,
                txn,
                command_id,
                user,
            },
            sql,
            params,
        })
}

fn response_strategy() -> impl Strategy<Value = Response> {
    (
        prop::option::of(
            (any::<String>(), any::<bool>())
                .prop_map(|(message, retryable)| ServerError { message, retryable }),
        ),
        prop::collection::vec(any::<u8>(), 0..32),
        prop::collection::vec(any::<u8>(), 0..32),
        prop::collection::vec(result_strategy(), 0..3),
    )
        .prop_map(|(error, session, txn, results)| Response {
            header: ResponseHeader {
                error,
                session,
                txn,
            },
            results,
        })
}

proptest! {
    #[test]
    fn prop_datum_roundtrip(datum in datum_strategy()) {
        let encoded = datum.encode().unwrap();
        prop_assert_eq!(encoded.len(), datum.encoded_size());
        let decoded = Datum::decode(&encoded).unwrap();
        prop_assert_eq!(decoded, datum);
    }

    #[test]
    fn prop_request_roundtrip(request in request_strategy()) {
        let encoded = request.encode().unwrap();
        prop_assert_eq!(encoded.len(), request.encoded_size());
        let decoded = Request::decode(&encoded).unwrap();
        prop_assert_eq!(decoded, request);
    }

    #[test]
    fn prop_response_roundtrip(response in response_strategy()) {
        let encoded = response.encode().unwrap();
        prop_assert_eq!(encoded.len(), response.encoded_size());
        let decoded = Response::decode(&encoded).unwrap();
        prop_assert_eq!(decoded, response);
    }

    #[test]
    fn prop_truncated_by_one_rejected(request in request_strategy()) {
        // A request always carries at least its header and sql fields,
        // so there is a byte to cut.
        let encoded = request.encode().unwrap();
        prop_assert!(!encoded.is_empty());
        let result = Request::decode(&encoded[..encoded.len() - 1]);
        prop_assert!(result.is_err());
    }

    #[test]
    fn prop_garbage_never_panics(data in prop::collection::vec(any::<u8>(), 0..256)) {
        // Any outcome is fine as long as it is a typed one.
        let _ = Datum::decode(&data);
        let _ = Request::decode(&data);
        let _ = Response::decode(&data);
    }
}
