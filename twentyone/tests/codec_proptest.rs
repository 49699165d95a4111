/// Property-based tests for the wire codec and hand values using proptest
///
/// These tests check that every valid message survives an encode/decode
/// round trip and that corrupted buffers are always rejected as invalid.
use proptest::prelude::*;
use twentyone::{
    bot::CardCounter,
    entities::{Card, Decision, RoundResult, Suit, hand_value},
    messages::{ClientDecision, Message, NAME_LEN, Offer, Request, ServerPayload},
};

// Strategy to generate a valid card (values 1-13, aces are value 1)
fn card_strategy() -> impl Strategy<Value = Card> {
    (1u8..=13, 0u8..=3).prop_map(|(value, suit)| {
        let suit = Suit::try_from(suit).unwrap();
        Card(value, suit)
    })
}

fn result_strategy() -> impl Strategy<Value = RoundResult> {
    (0u8..=3).prop_map(|code| RoundResult::try_from(code).unwrap())
}

fn payload_strategy() -> impl Strategy<Value = ServerPayload> {
    (result_strategy(), card_strategy()).prop_map(|(result, card)| ServerPayload { result, card })
}

fn decision_strategy() -> impl Strategy<Value = Decision> {
    prop_oneof![Just(Decision::Hit), Just(Decision::Stand)]
}

// Names that survive the fixed field: no zero bytes, at most 32 bytes
fn name_strategy() -> impl Strategy<Value = String> {
    proptest::string::string_regex("[A-Za-z0-9 ]{0,32}").unwrap()
}

// One valid encoding of each message kind
fn encoded_strategy() -> impl Strategy<Value = (Vec<u8>, Vec<u8>, Vec<u8>, Vec<u8>)> {
    (
        any::<u16>(),
        name_strategy(),
        any::<u8>(),
        decision_strategy(),
        payload_strategy(),
    )
        .prop_map(|(tcp_port, name, rounds, decision, payload)| {
            (
                Offer { tcp_port, name: name.clone() }.encode(),
                Request { rounds, team_name: name }.encode(),
                ClientDecision(decision).encode(),
                payload.encode(),
            )
        })
}

fn flip(mut bytes: Vec<u8>, index: usize, mask: u8) -> Vec<u8> {
    bytes[index] ^= mask;
    bytes
}

fn with_tag(mut bytes: Vec<u8>, tag: u8) -> Vec<u8> {
    bytes[4] = tag;
    bytes
}

proptest! {
    #[test]
    fn test_payload_round_trip(payload in payload_strategy()) {
        let bytes = payload.encode();
        prop_assert_eq!(bytes.len(), ServerPayload::LEN);
        prop_assert_eq!(ServerPayload::decode(&bytes), Ok(payload));
    }

    #[test]
    fn test_decision_round_trip(decision in decision_strategy()) {
        let msg = ClientDecision(decision);
        prop_assert_eq!(ClientDecision::decode(&msg.encode()), Ok(msg));
    }

    #[test]
    fn test_request_round_trip(rounds in any::<u8>(), team_name in name_strategy()) {
        let msg = Request { rounds, team_name };
        prop_assert_eq!(Request::decode(&msg.encode()), Ok(msg));
    }

    #[test]
    fn test_offer_round_trip(tcp_port in any::<u16>(), name in name_strategy()) {
        let msg = Offer { tcp_port, name };
        prop_assert_eq!(Offer::decode(&msg.encode()), Ok(msg));
    }

    #[test]
    fn test_long_names_are_truncated(name in "[a-z]{33,64}") {
        let msg = Request { rounds: 1, team_name: name.clone() };
        let decoded = Request::decode(&msg.encode()).unwrap();
        prop_assert_eq!(decoded.team_name, &name[..NAME_LEN]);
    }

    #[test]
    fn test_cookie_flip_is_rejected(
        messages in encoded_strategy(),
        index in 0usize..4,
        mask in 1u8..=255,
    ) {
        let (offer, request, decision, payload) = messages;
        prop_assert!(Offer::decode(&flip(offer, index, mask)).is_err());
        prop_assert!(Request::decode(&flip(request, index, mask)).is_err());
        prop_assert!(ClientDecision::decode(&flip(decision, index, mask)).is_err());
        prop_assert!(ServerPayload::decode(&flip(payload, index, mask)).is_err());
    }

    #[test]
    fn test_wrong_tag_is_rejected(messages in encoded_strategy(), tag in any::<u8>()) {
        let (offer, request, decision, payload) = messages;
        if tag != Offer::TAG {
            prop_assert!(Offer::decode(&with_tag(offer, tag)).is_err());
        }
        if tag != Request::TAG {
            prop_assert!(Request::decode(&with_tag(request, tag)).is_err());
        }
        if tag != ClientDecision::TAG {
            prop_assert!(ClientDecision::decode(&with_tag(decision, tag)).is_err());
        }
        if tag != ServerPayload::TAG {
            prop_assert!(ServerPayload::decode(&with_tag(payload, tag)).is_err());
        }
    }

    #[test]
    fn test_truncation_is_rejected(messages in encoded_strategy(), cut in 1usize..=9) {
        let (offer, request, decision, payload) = messages;
        prop_assert!(Offer::decode(&offer[..Offer::LEN - cut]).is_err());
        prop_assert!(Request::decode(&request[..Request::LEN - cut]).is_err());
        prop_assert!(ClientDecision::decode(&decision[..ClientDecision::LEN - cut]).is_err());
        prop_assert!(ServerPayload::decode(&payload[..ServerPayload::LEN - cut]).is_err());
    }

    #[test]
    fn test_arbitrary_bytes_never_panic(bytes in prop::collection::vec(any::<u8>(), 0..64)) {
        let _ = Offer::decode(&bytes);
        let _ = Request::decode(&bytes);
        let _ = ClientDecision::decode(&bytes);
        let _ = ServerPayload::decode(&bytes);
    }

    #[test]
    fn test_hand_value_promotes_at_most_one_ace(ranks in prop::collection::vec(1u8..=13, 1..8)) {
        let hard: u16 = ranks.iter().map(|&r| u16::from(r.min(10))).sum();
        let (total, soft) = hand_value(ranks.iter().copied());
        if soft {
            prop_assert!(ranks.contains(&1));
            prop_assert_eq!(total, hard + 10);
            prop_assert!(total <= 21);
        } else {
            prop_assert_eq!(total, hard);
        }
    }

    #[test]
    fn test_bust_probability_is_a_probability(
        hand in prop::collection::vec(1u8..=13, 1..6),
        seen in prop::collection::vec(1u8..=13, 0..52),
    ) {
        let mut counter = CardCounter::new();
        for rank in seen {
            counter.mark_seen(rank);
        }
        let p = counter.bust_probability_if_hit(&hand);
        prop_assert!((0.0..=1.0).contains(&p));
    }
}
