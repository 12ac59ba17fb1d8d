mod common;

use std::time::Duration;
use rga100::{
    Rga, Config, Error,
    command::{self, Parameter, STATUS_COMMANDS},
    status::Fault,
    };
use common::{MockTransport, CLEAN, run};


fn config() -> Config {
    Config::default()
        .with_read_attempts(5)
        .with_reply_attempts(5)
        .with_backoff(Duration::from_millis(10))
}


#[test]
fn queries_skip_status() {
    run(async {
        for mnemonic in STATUS_COMMANDS {
            let mut rga = Rga::new(MockTransport::new(), config());
            rga.dispatch(mnemonic, Parameter::Query).await.unwrap();
            assert_eq!(rga.transport().polls, 0);
            assert_eq!(rga.transport().frames(), [format!("{}?", mnemonic)]);
        }
    });
}

#[test]
fn settings_check_status() {
    run(async {
        for mnemonic in STATUS_COMMANDS {
            let mut rga = Rga::new(MockTransport::new().reply(CLEAN), config());
            rga.dispatch(mnemonic, Parameter::Integer(2)).await.unwrap();
            assert_eq!(rga.transport().polls, 1);
            assert!(rga.transport().incoming.is_empty());
            assert_eq!(rga.transport().frames(), [format!("{}2", mnemonic)]);
        }
    });
}

#[test]
fn missing_status_times_out() {
    run(async {
        let mut rga = Rga::new(MockTransport::new(), config());
        let result = rga.dispatch(command::CALIBRATE_ALL, Parameter::None).await;
        assert!(matches!(result, Err(Error::Timeout)));
        assert_eq!(rga.transport().polls, 5);
    });
}

#[test]
fn faults_are_surfaced() {
    run(async {
        let mut rga = Rga::new(MockTransport::new().reply(b"\x12\r\n"), config());
        match rga.dispatch(command::NOISE_FLOOR, Parameter::Integer(0)).await {
            Err(Error::Instrument(faults)) => {
                assert_eq!(faults.iter().collect::<Vec<_>>(), [Fault::MassFilter, Fault::Filament]);
            },
            other => panic!("unexpected result {:?}", other),
        }
    });
}

#[test]
fn multiplier_fault_needs_option() {
    run(async {
        let mut rga = Rga::new(MockTransport::new().reply(b"\x08\r\n"), config());
        rga.dispatch(command::CALIBRATE_ALL, Parameter::None).await.unwrap();
        
        let mut rga = Rga::new(MockTransport::new().reply(b"\x08\r\n"), config().with_cdem(true));
        let result = rga.dispatch(command::CALIBRATE_ALL, Parameter::None).await;
        assert!(matches!(result, Err(Error::Instrument(faults)) if faults.contains(Fault::ElectronMultiplier)));
    });
}

#[test]
fn configured_status_commands() {
    run(async {
        let config = config().with_status_commands([command::NOISE_FLOOR]);
        let mut rga = Rga::new(MockTransport::new(), config);
        rga.dispatch(command::CALIBRATE_ALL, Parameter::None).await.unwrap();
        assert_eq!(rga.transport().polls, 0);
    });
}

#[test]
fn filament_on_within_tolerance() {
    run(async {
        let transport = MockTransport::new()
            .reply(CLEAN)
            .reply(b"1.05\r\n");
        let mut rga = Rga::new(transport, config().with_filament_tolerance(0.1));
        rga.turn_filament_on(1.0).await.unwrap();
        assert_eq!(rga.transport().frames(), ["FL1.00", "FL?"]);
    });
}

#[test]
fn filament_on_out_of_tolerance() {
    run(async {
        let transport = MockTransport::new()
            .reply(CLEAN)
            .reply(b"1.2\r\n");
        let mut rga = Rga::new(transport, config().with_filament_tolerance(0.1));
        let result = rga.turn_filament_on(1.0).await;
        assert!(matches!(result, Err(Error::Verification {commanded, readback}) 
            if commanded == 1.0 && readback == 1.2));
    });
}

#[test]
fn begin_turns_filament_off() {
    run(async {
        let transport = MockTransport::new()
            .reply(CLEAN)
            .reply(b"0.00\r\n");
        let mut rga = Rga::new(transport, config());
        rga.transport_mut().receive(b"noise from power up");
        rga.begin().await.unwrap();
        assert_eq!(rga.transport().frames(), ["FL0.00", "FL?"]);
        // start-up, then before each command expecting a reply
        assert_eq!(rga.transport().flushes, 3);
    });
}

#[test]
fn filament_readback_lost() {
    run(async {
        let mut rga = Rga::new(MockTransport::new().reply(CLEAN), config());
        assert!(matches!(rga.turn_filament_off().await, Err(Error::Timeout)));
    });
}

#[test]
fn reply_arriving_late() {
    run(async {
        let mut rga = Rga::new(MockTransport::new(), config().with_reply_attempts(10));
        rga.transport_mut().trickle.extend(b"9.9\r\n");
        assert_eq!(rga.query(command::FILAMENT).await.unwrap(), 9.9);
    });
}

#[test]
fn setting_operations_flush() {
    run(async {
        let transport = MockTransport::new()
            .reply(b"\x00\r\nleftover")
            .reply(b"\x00\r\nleftover");
        let mut rga = Rga::new(transport, config());
        rga.set_noise_floor(3).await.unwrap();
        assert!(rga.transport().incoming.is_empty());
        rga.calibrate_all().await.unwrap();
        assert!(rga.transport().incoming.is_empty());
        assert_eq!(rga.transport().frames(), ["NF3", "CA"]);
        // before sending and after the status check of each command
        assert_eq!(rga.transport().flushes, 4);
    });
}

#[test]
fn total_pressure_is_raw() {
    run(async {
        let mut rga = Rga::new(MockTransport::new().reply(b"-123\r\n"), config());
        assert_eq!(rga.total_pressure().await.unwrap(), -123.);
        assert_eq!(rga.transport().frames(), ["TP?"]);
        assert_eq!(rga.transport().polls, 0);
    });
}

#[test]
fn unparsable_reply() {
    run(async {
        let mut rga = Rga::new(MockTransport::new().reply(b"oops\r\n"), config());
        assert!(matches!(rga.total_pressure().await, Err(Error::Driver(_))));
    });
}

#[test]
fn filament_tolerance_includes_edges() {
    run(async {
        for readback in [b"1.1\r\n", b"0.9\r\n"] {
            let transport = MockTransport::new()
                .reply(CLEAN)
                .reply(readback);
            let mut rga = Rga::new(transport, config().with_filament_tolerance(0.1));
            rga.turn_filament_on(1.0).await.unwrap();
        }
    });
}

#[test]
fn default_status_wait_covers_calibration() {
    let config = Config::default();
    assert!(config.backoff * config.read_attempts >= Duration::from_secs(20));
}

#[test]
fn late_line_after_timeout() {
    run(async {
        let transport = MockTransport::new()
            .reply(b"")
            .reply(b"7\r\n");
        let mut rga = Rga::new(transport, config());
        assert!(matches!(rga.query(command::FILAMENT).await, Err(Error::Timeout)));
        // answer to the lost query arrives during the next one
        rga.transport_mut().receive(b"0.50\r\n");
        assert_eq!(rga.total_pressure().await.unwrap(), 7.);
    });
}

#[test]
fn partial_line_after_timeout() {
    run(async {
        let transport = MockTransport::new()
            .reply(b"1")
            .reply(b"5\r\n");
        let mut rga = Rga::new(transport, config());
        assert!(matches!(rga.query(command::FILAMENT).await, Err(Error::Timeout)));
        assert_eq!(rga.total_pressure().await.unwrap(), 5.);
    });
}

#[test]
fn partial_status_after_timeout() {
    run(async {
        let transport = MockTransport::new()
            .reply(b"\x00")
            .reply(CLEAN)
            .reply(b"2\r\n");
        let mut rga = Rga::new(transport, config());
        let result = rga.dispatch(command::CALIBRATE_ALL, Parameter::None).await;
        assert!(matches!(result, Err(Error::Timeout)));
        assert!(rga.transport().incoming.is_empty());
        
        rga.transport_mut().receive(b"\r\n");
        rga.dispatch(command::NOISE_FLOOR, Parameter::Integer(2)).await.unwrap();
        assert_eq!(rga.query(command::NOISE_FLOOR).await.unwrap(), 2.);
        assert_eq!(rga.transport().frames(), ["CA", "NF2", "NF?"]);
    });
}

#[test]
fn late_status_after_timeout() {
    run(async {
        let transport = MockTransport::new()
            .reply(b"")
            .reply(CLEAN);
        let mut rga = Rga::new(transport, config());
        let result = rga.dispatch(command::CALIBRATE_ALL, Parameter::None).await;
        assert!(matches!(result, Err(Error::Timeout)));
        
        // filament fault echoed by the lost command, after the timeout
        rga.transport_mut().receive(b"\x02\r\n");
        rga.dispatch(command::NOISE_FLOOR, Parameter::Integer(0)).await.unwrap();
    });
}
