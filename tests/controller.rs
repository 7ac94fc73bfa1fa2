mod common;

mod tests {
    use std::time::Duration as StdDuration;

    use myrtio_torch_patterns::pattern::{BEACON_ON_SECONDS, BEACON_PERIOD_SECONDS};
    use myrtio_torch_patterns::{
        EmissionCommand, EngineConfig, EngineError, EngineEvent, EngineState, Instant,
        PatternKind, PatternSettings, SafetyConfig, SettingsChange, TorchController, Waveform,
    };

    use crate::common::{MockTorch, wait_for};

    #[test]
    fn test_default_settings() {
        let settings = PatternSettings::default();
        assert_eq!(settings.kind, PatternKind::Continuous);
        assert_eq!(settings.brightness, 0.75);
        assert_eq!(settings.frequency_hz, 2.0);
        assert_eq!(settings.duty_cycle, 0.5);
        assert!(settings.safety_cap_enabled);
    }

    #[test]
    fn test_apply_change() {
        let mut settings = PatternSettings::default();
        settings.apply(&SettingsChange {
            kind: Some(PatternKind::Strobe),
            brightness: Some(1.4),
            frequency_hz: Some(9.0),
            ..SettingsChange::default()
        });

        assert_eq!(settings.kind, PatternKind::Strobe);
        assert_eq!(settings.brightness, 1.0);
        assert_eq!(settings.frequency_hz, 9.0);
        assert_eq!(settings.duty_cycle, 0.5);
    }

    #[test]
    fn test_waveform_from_settings() {
        let safety = SafetyConfig::default();
        let mut settings = PatternSettings {
            kind: PatternKind::Strobe,
            frequency_hz: 9.0,
            ..PatternSettings::default()
        };

        assert_eq!(
            settings.waveform(&settings.safety(safety)),
            Waveform::Strobe {
                frequency_hz: 3.0,
                duty_cycle: 0.5
            }
        );

        settings.safety_cap_enabled = false;
        assert_eq!(
            settings.waveform(&settings.safety(safety)),
            Waveform::Strobe {
                frequency_hz: 9.0,
                duty_cycle: 0.5
            }
        );

        settings.kind = PatternKind::Beacon;
        assert_eq!(
            settings.waveform(&safety),
            Waveform::Beacon {
                period_seconds: BEACON_PERIOD_SECONDS,
                on_seconds: BEACON_ON_SECONDS,
            }
        );
    }

    #[test]
    fn test_start_and_stop() {
        let torch = MockTorch::new();
        let controller = TorchController::new(torch.clone(), EngineConfig::default());

        controller.start().unwrap();
        assert!(controller.is_running());
        assert!(wait_for(StdDuration::from_secs(1), || torch.on_count() == 1));
        assert_eq!(torch.commands()[0], EmissionCommand::on(0.75));

        controller.stop();
        assert_eq!(controller.state(), EngineState::Idle);
        assert!(!torch.is_locked());
        assert_eq!(controller.events().snapshot().last(), Some(&EngineEvent::Stopped));
    }

    #[test]
    fn test_start_failure_is_logged() {
        let torch = MockTorch::new().unsupported();
        let controller = TorchController::new(torch, EngineConfig::default());

        assert_eq!(controller.start(), Err(EngineError::Unsupported));
        assert!(!controller.is_running());
        assert_eq!(
            controller.events().try_receive(),
            Some(EngineEvent::StartFailed(EngineError::Unsupported))
        );
    }

    #[test]
    fn test_cap_toggle_reaches_engine() {
        let torch = MockTorch::new();
        let mut controller = TorchController::new(torch, EngineConfig::default());
        assert!(controller.engine().config().safety.frequency_cap_enabled);

        controller.apply(&SettingsChange {
            kind: Some(PatternKind::Strobe),
            safety_cap_enabled: Some(false),
            ..SettingsChange::default()
        });
        controller.start().unwrap();
        controller.stop();

        assert!(!controller.engine().config().safety.frequency_cap_enabled);
    }

    #[test]
    fn test_simulation_matches_settings() {
        let torch = MockTorch::new();
        let mut controller = TorchController::new(torch.clone(), EngineConfig::default());
        controller.apply(&SettingsChange {
            kind: Some(PatternKind::Strobe),
            frequency_hz: Some(12.0),
            duty_cycle: Some(0.25),
            ..SettingsChange::default()
        });

        let simulation = controller.simulation(Instant::from_millis(0));
        assert_eq!(simulation.kind(), PatternKind::Strobe);
        assert_eq!(simulation.frequency_hz(), 3.0);
        assert_eq!(simulation.duty_cycle(), 0.25);

        // Previewing never touches the device
        assert!(torch.calls().is_empty());
    }
}
