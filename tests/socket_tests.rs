use moteflow::codec::TelemetryReading;
use moteflow::socket::*;

fn mote(id: u64) -> EndpointRef {
    EndpointRef::new(0x0200_0000_0000_0000 | id)
}

#[cfg(test)]
mod send_tests {
    use super::*;

    #[test]
    fn test_attach_produces_zero_sentinel() {
        for (port, id) in [(0u16, 1u64), (1, 2), (42, 3), (u16::MAX, 0xFFFF)] {
            let mut socket = TelemetrySocket::new();
            let message = socket.send(port, mote(id), &["attach"]).unwrap();
            assert_eq!(message, [0, 0, 0, 0]);
        }
    }

    #[test]
    fn test_attach_records_destination() {
        let mut socket = TelemetrySocket::new();
        assert_eq!(socket.state(), SocketState::Unattached);
        assert!(socket.destination_endpoint().is_none());

        socket.send(7, mote(5), &["attach"]).unwrap();

        assert_eq!(socket.state(), SocketState::Attached);
        assert!(socket.is_attached());
        assert_eq!(socket.destination_port(), Some(7));
        assert_eq!(socket.destination_endpoint(), Some(mote(5)));
    }

    #[test]
    fn test_wrong_argument_count_rejected() {
        let empty: [&str; 0] = [];
        let cases: Vec<Vec<&str>> = vec![
            empty.to_vec(),
            vec!["attach", "attach"],
            vec!["attach", "now"],
            vec!["a", "b", "c"],
        ];

        for args in cases {
            let mut socket = TelemetrySocket::new();
            let result = socket.send(1, mote(1), args.as_slice());
            assert_eq!(result, Err(SocketError::InvalidArguments { count: args.len() }));
            // Nothing changes on a rejected command
            assert_eq!(socket.state(), SocketState::Unattached);
        }
    }

    #[test]
    fn test_unsupported_command_rejected() {
        for token in ["x", "detach", "ATTACH", " attach", ""] {
            let mut socket = TelemetrySocket::new();
            let result = socket.send(1, mote(1), &[token]);
            assert_eq!(result, Err(SocketError::UnsupportedCommand(token.to_string())));
            assert_eq!(socket.state(), SocketState::Unattached);
        }
    }

    #[test]
    fn test_second_attach_rejected() {
        let mut socket = TelemetrySocket::new();
        socket.send(1, mote(1), &["attach"]).unwrap();

        assert_eq!(socket.send(1, mote(1), &["attach"]), Err(SocketError::AlreadyAttached));
        // Destination stays as first attached
        assert_eq!(socket.destination_endpoint(), Some(mote(1)));
    }

    #[test]
    fn test_send_after_close_rejected() {
        let mut socket = TelemetrySocket::new();
        socket.send(1, mote(1), &["attach"]).unwrap();
        socket.on_close(0);

        assert_eq!(socket.send(1, mote(1), &["attach"]), Err(SocketError::SocketClosed));
        assert_eq!(socket.state(), SocketState::Closed);
    }

    #[test]
    fn test_argument_errors_take_precedence_over_state() {
        let mut socket = TelemetrySocket::new();
        socket.on_close(0);

        assert_eq!(
            socket.send(1, mote(1), &["bogus"]),
            Err(SocketError::UnsupportedCommand("bogus".into()))
        );
    }

    #[test]
    fn test_command_parsing() {
        assert_eq!(SocketCommand::from_args(&["attach"]), Ok(SocketCommand::Attach));
        assert_eq!("attach".parse::<SocketCommand>(), Ok(SocketCommand::Attach));
        assert!(matches!(
            SocketCommand::from_args::<&str>(&[]),
            Err(SocketError::InvalidArguments { count: 0 })
        ));
    }

    #[test]
    fn test_error_messages() {
        assert!(SocketError::InvalidArguments { count: 2 }
            .to_string()
            .contains("wrong parameter count"));
        assert!(SocketError::UnsupportedCommand("x".into())
            .to_string()
            .contains("only attach is supported"));
    }
}

#[cfg(test)]
mod broadcast_tests {
    use super::*;

    #[test]
    fn test_broadcast_is_a_stub() {
        let mut socket = TelemetrySocket::new();
        socket.send(1, mote(1), &["attach"]).unwrap();

        assert!(socket.broadcast(mote(9), 1, &["attach"]).is_none());
        assert!(socket.broadcast::<&str>(mote(9), 1, &[]).is_none());
        assert_eq!(socket.state(), SocketState::Attached);
    }

    #[test]
    fn test_send_and_broadcast_share_outbound_message_type() {
        let mut socket = TelemetrySocket::new();
        let sent: OutboundMessage = socket.send(3, mote(4), &["attach"]).unwrap();
        let broadcast: Option<OutboundMessage> = socket.broadcast(mote(4), 3, &["attach"]);

        assert_eq!(sent.len(), ATTACH_MESSAGE_LEN);
        assert_eq!(broadcast, None);
    }
}

#[cfg(test)]
mod on_data_tests {
    use super::*;

    fn attached() -> TelemetrySocket {
        let mut socket = TelemetrySocket::new();
        socket.send(1, mote(1), &["attach"]).unwrap();
        socket
    }

    #[test]
    fn test_valid_reading_is_decoded() {
        let socket = attached();
        let frame = InboundFrame::new(mote(1), 1, vec![0x00, 0x19, 0x00, 0x3C]);

        let line = socket.on_data(&frame);

        assert!(line.starts_with("SOCK1 received temperature/humidity:"));
        assert!(line.contains("02-00-00-00-00-00-00-01"));
        assert!(line.contains("0019003c"));
        assert!(line.ends_with("25/60"));
    }

    #[test]
    fn test_reading_encoded_by_codec_round_trips_through_socket() {
        let socket = attached();
        let payload = TelemetryReading::new(25, 60).encode().to_vec();
        let line = socket.on_data(&InboundFrame::new(mote(1), 1, payload));
        assert!(line.ends_with(" 25/60"));
    }

    #[test]
    fn test_invalid_lengths_produce_invalid_data_line() {
        let socket = attached();
        for len in [0usize, 1, 2, 3, 5, 8, 64, 65_536] {
            let frame = InboundFrame::new(mote(3), 17, vec![0xAB; len]);
            let line = socket.on_data(&frame);

            assert!(line.starts_with("SOCK1 invalid data: "), "len {len}: {line}");
            assert!(line.contains("02-00-00-00-00-00-00-03, 17, "));
            assert!(!line.contains("temperature/humidity"));
            assert!(line.ends_with(&"ab".repeat(len)));
        }
    }

    #[test]
    fn test_on_data_before_attach_still_renders() {
        let socket = TelemetrySocket::new();
        let line = socket.on_data(&InboundFrame::new(mote(1), 1, vec![0, 1, 0, 2]));
        assert!(line.ends_with("1/2"));
    }

    #[test]
    fn test_custom_socket_name_prefixes_lines() {
        let socket = TelemetrySocket::with_name("THERMO").unwrap();
        let line = socket.on_data(&InboundFrame::new(mote(1), 1, vec![]));
        assert!(line.starts_with("THERMO invalid data: "));
    }

    #[test]
    fn test_socket_name_validation() {
        assert_eq!(TelemetrySocket::with_name("").unwrap_err(), SocketError::InvalidName);
        assert_eq!(
            TelemetrySocket::with_name("A_NAME_THAT_IS_TOO_LONG").unwrap_err(),
            SocketError::InvalidName
        );
    }
}

#[cfg(test)]
mod close_tests {
    use super::*;

    #[test]
    fn test_close_is_idempotent() {
        let mut socket = TelemetrySocket::new();
        socket.send(1, mote(1), &["attach"]).unwrap();

        socket.on_close(0);
        socket.on_close(-1);

        assert_eq!(socket.state(), SocketState::Closed);
    }
}

#[cfg(test)]
mod endpoint_tests {
    use super::*;

    #[test]
    fn test_endpoint_display_and_parse() {
        let endpoint: EndpointRef = "02-00-00-00-00-00-12-34".parse().unwrap();
        assert_eq!(endpoint.eui64(), 0x0200_0000_0000_1234);
        assert_eq!(endpoint.short_addr(), 0x1234);
        assert_eq!(endpoint.to_string(), "02-00-00-00-00-00-12-34");
    }

    #[test]
    fn test_endpoint_parse_rejects_malformed() {
        for text in [
            "",
            "02-00",
            "02-00-00-00-00-00-00-00-01",
            "zz-00-00-00-00-00-00-01",
            "2-00-00-00-00-00-00-01",
        ] {
            assert!(text.parse::<EndpointRef>().is_err(), "{text}");
        }
    }

    #[test]
    fn test_inbound_frame_json() {
        let frame = InboundFrame::new(mote(1), 4, vec![0, 25, 0, 60]);
        let json = serde_json::to_string(&frame).unwrap();
        assert!(json.contains("\"02-00-00-00-00-00-00-01\""));

        let parsed: InboundFrame = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, frame);
    }
}
