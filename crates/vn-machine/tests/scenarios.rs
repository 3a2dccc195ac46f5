use pretty_assertions::assert_eq;
use vn_bytecode::descriptor::INT;
use vn_bytecode::{assemble, IntBank, OpcodeKey};
use vn_core::{Error, KeyCode, MouseButton, Point};
use vn_machine::builtins::{self, keys};
use vn_machine::ops::WaitOperation;
use vn_machine::{
    CompletionHook, EntryState, Headless, Machine, MachineError, MachineOptions, MachineState,
};

const TIMED: OpcodeKey = OpcodeKey::new(9, 0, 0);

fn options() -> MachineOptions {
    MachineOptions {
        automode: false,
        message_speed_ms: 0,
        ..MachineOptions::default()
    }
}

fn build(source: &str, headless: &Headless, options: MachineOptions) -> Machine {
    let script = assemble("scenario", source).expect("assemble");
    Machine::with_builtins(script, headless.collaborators(), options).expect("machine")
}

/// Builtins plus `9:0:0 ms`: a timed wait whose completion hook bumps intB[0].
fn build_with_counter(source: &str, headless: &Headless) -> Machine {
    let mut registry = builtins::registry().expect("registry");
    registry
        .register(TIMED, "timed", &[&INT], |ctx, (ms,): (i32,)| {
            let wait = WaitOperation::new(ctx.now(), ms as u64);
            let hook = CompletionHook::callback(|ctx| {
                let fired = ctx.memory.int(IntBank::B, 0)?;
                ctx.memory.set_int(IntBank::B, 0, fired + 1)
            });
            ctx.push_with_hook(wait, hook);
            Ok(())
        })
        .expect("register");
    let script = assemble("scenario", source).expect("assemble");
    Machine::new(script, registry, headless.collaborators(), options())
}

fn int(machine: &Machine, bank: IntBank, index: i32) -> i32 {
    machine.memory().int(bank, index).expect("read")
}

#[test]
fn timed_operation_completes_and_fires_its_hook_once() {
    let headless = Headless::new(20, 3);
    let mut machine = build_with_counter("9:0:0 500\n3:0:0 intA[0], 1\n", &headless);

    assert_eq!(machine.tick(0).unwrap(), MachineState::Waiting);
    assert_eq!(machine.stack().len(), 1);
    assert_eq!(machine.pc(), 0);

    assert_eq!(machine.tick(600).unwrap(), MachineState::Halted);
    assert!(machine.stack().is_empty());
    assert_eq!(int(&machine, IntBank::B, 0), 1);
    assert_eq!(int(&machine, IntBank::A, 0), 1);
    assert_eq!(machine.pc(), 2);
}

#[test]
fn forced_discard_skips_the_hook_but_still_advances() {
    let headless = Headless::new(20, 3);
    let mut machine = build_with_counter("9:0:0 500\n3:0:0 intA[0], 1\n", &headless);
    machine.tick(0).unwrap();

    assert_eq!(machine.discard_operations(), 1);
    assert_eq!(machine.tick(16).unwrap(), MachineState::Halted);
    assert_eq!(int(&machine, IntBank::B, 0), 0);
    assert_eq!(int(&machine, IntBank::A, 0), 1);
}

#[test]
fn wait_times_out_before_the_next_instruction() {
    let headless = Headless::new(20, 3);
    let mut machine = build("2:0:0 500\n3:0:0 intA[0], 1\n0:0:0\n", &headless, options());

    assert_eq!(machine.tick(0).unwrap(), MachineState::Waiting);
    assert_eq!(machine.tick(400).unwrap(), MachineState::Waiting);
    assert_eq!(int(&machine, IntBank::A, 0), 0);
    assert!(!machine.button_state_changed(MouseButton::Left, true));

    assert_eq!(machine.tick(200).unwrap(), MachineState::Halted);
    assert_eq!(int(&machine, IntBank::A, 0), 1);
    assert_eq!(machine.pc(), 2);
    assert_eq!(machine.tick(16).unwrap(), MachineState::Halted);
}

#[test]
fn interruptible_wait_records_the_button() {
    let headless = Headless::new(20, 3);
    let mut machine = build("2:1:0 5000\n", &headless, options());
    machine.tick(0).unwrap();
    assert_eq!(machine.tick(100).unwrap(), MachineState::Waiting);

    assert!(machine.button_state_changed(MouseButton::Right, true));
    assert_eq!(machine.tick(16).unwrap(), MachineState::Halted);
    assert_eq!(machine.memory().store(), -1);
}

#[test]
fn interruptible_wait_that_times_out_stores_zero() {
    let headless = Headless::new(20, 3);
    let mut machine = build("3:3:0 9\n2:1:0 50\n", &headless, options());
    machine.tick(0).unwrap();
    assert_eq!(machine.memory().store(), 9);
    assert_eq!(machine.tick(50).unwrap(), MachineState::Halted);
    assert_eq!(machine.memory().store(), 0);
}

#[test]
fn short_composite_is_a_system_error_and_nothing_runs() {
    let headless = Headless::new(20, 3);
    let mut machine = build("5:0:0 0, 0, 100\n", &headless, options());

    let err = machine.tick(0).unwrap_err();
    match &err {
        MachineError::System { pc, key, source } => {
            assert_eq!(*pc, 0);
            assert_eq!(*key, keys::FILL_RECT_GRP);
            assert!(source.is_malformed());
        }
        other => panic!("unexpected error {other}"),
    }
    assert!(headless.graphics.log().is_empty());
    assert_eq!(machine.pc(), 0);
}

#[test]
fn extreme_rect_corners_fail_in_the_collaborator() {
    let headless = Headless::new(20, 3);
    let mut machine = build("5:0:0 -2147483648, 0, 2147483647, 10\n", &headless, options());

    let err = machine.tick(0).unwrap_err();
    assert!(matches!(err, MachineError::System { pc: 0, .. }));
    assert!(matches!(err.cause(), Some(Error::Collaborator { .. })));
    assert!(headless.graphics.log().is_empty());
}

#[test]
fn trailing_tokens_and_unknown_opcodes_are_rejected() {
    let headless = Headless::new(20, 3);
    let mut machine = build("3:3:0 1, 2\n", &headless, options());
    let err = machine.step().unwrap_err();
    assert!(err.cause().is_some_and(Error::is_malformed));
    assert_eq!(machine.memory().store(), 0);

    let mut machine = build("7:7:7\n", &headless, options());
    let err = machine.step().unwrap_err();
    assert!(matches!(
        err.cause(),
        Some(Error::UnknownOpcode {
            module: 7,
            opcode: 7,
            overload: 7
        })
    ));
}

#[test]
fn evaluation_errors_surface_with_the_instruction() {
    let headless = Headless::new(20, 3);
    let mut machine = build("3:0:0 intA[0], 10 / intA[1]\n", &headless, options());
    let err = machine.step().unwrap_err();
    assert!(matches!(err.cause(), Some(Error::Evaluation { .. })));
    assert!(err.to_string().starts_with("system error at instruction 0 (3:0:0)"));
}

#[test]
fn full_page_pauses_then_continues_on_a_new_page() {
    let headless = Headless::new(4, 1);
    let mut machine = build("1:0:0 \"abcdefg\"\n0:0:0\n", &headless, options());

    assert_eq!(machine.tick(0).unwrap(), MachineState::Waiting);
    assert_eq!(machine.tick(16).unwrap(), MachineState::Waiting);
    assert_eq!(headless.text.page(), "abcd");
    assert_eq!(machine.stack().top_name(), Some("pause"));
    assert_eq!(
        machine.stack().states(),
        vec![EntryState::Dormant, EntryState::Active]
    );

    assert_eq!(machine.tick(5000).unwrap(), MachineState::Waiting);
    assert!(machine.key_state_changed(KeyCode::Return, true));
    assert_eq!(machine.tick(16).unwrap(), MachineState::Waiting);
    assert_eq!(headless.text.pages(), vec!["abcd".to_string()]);
    assert_eq!(headless.text.page(), "");
    assert_eq!(machine.stack().top_name(), Some("textout"));

    assert_eq!(machine.tick(16).unwrap(), MachineState::Halted);
    assert_eq!(headless.text.transcript(), "abcd\n--\nefg");
}

#[test]
fn text_reveals_over_time_until_clicked() {
    let headless = Headless::new(20, 3);
    let options = MachineOptions {
        message_speed_ms: 100,
        ..options()
    };
    let mut machine = build("1:0:0 \"hello\"\n", &headless, options);

    machine.tick(0).unwrap();
    machine.tick(16).unwrap();
    assert_eq!(headless.text.page(), "h");
    machine.tick(100).unwrap();
    assert_eq!(headless.text.page(), "he");

    assert!(machine.button_state_changed(MouseButton::Left, true));
    assert_eq!(machine.tick(16).unwrap(), MachineState::Halted);
    assert_eq!(headless.text.page(), "hello");
}

#[test]
fn pause_waits_for_an_advance_key() {
    let headless = Headless::new(20, 3);
    let mut machine = build("1:3:0\n3:0:0 intA[1], 7\n", &headless, options());
    machine.tick(0).unwrap();
    assert_eq!(machine.tick(10_000).unwrap(), MachineState::Waiting);

    assert!(!machine.key_state_changed(KeyCode::Escape, true));
    assert!(!machine.pointer_moved(Point::new(3, 4)));
    assert!(machine.key_state_changed(KeyCode::Space, true));
    assert_eq!(machine.tick(16).unwrap(), MachineState::Halted);
    assert_eq!(int(&machine, IntBank::A, 1), 7);
}

#[test]
fn automode_pause_finishes_by_itself() {
    let headless = Headless::new(20, 3);
    let options = MachineOptions {
        automode: true,
        automode_ms: 1000,
        ..options()
    };
    let mut machine = build("1:3:0\n3:0:0 intA[1], 7\n", &headless, options);
    machine.tick(0).unwrap();
    assert_eq!(machine.tick(999).unwrap(), MachineState::Waiting);
    assert_eq!(machine.tick(1).unwrap(), MachineState::Halted);
    assert_eq!(int(&machine, IntBank::A, 1), 7);
}

#[test]
fn pause_page_clears_the_page_after_acknowledgement() {
    let headless = Headless::new(20, 3);
    let mut machine = build("1:0:0 \"hi\"\n1:4:0\n1:0:0 \"yo\"\n", &headless, options());

    machine.tick(0).unwrap();
    assert_eq!(machine.tick(16).unwrap(), MachineState::Waiting);
    assert_eq!(machine.stack().top_name(), Some("pause"));
    assert!(machine.button_state_changed(MouseButton::Left, true));

    assert_eq!(machine.tick(16).unwrap(), MachineState::Waiting);
    assert_eq!(headless.text.pages(), vec!["hi".to_string()]);
    assert_eq!(machine.tick(16).unwrap(), MachineState::Halted);
    assert_eq!(headless.text.page(), "yo");
}

#[test]
fn sound_waits_poll_until_playback_stops() {
    let headless = Headless::new(20, 3);
    headless.sound.set_wav_playing(2, true);
    let mut machine = build("4:2:0 2\n3:0:0 intA[0], 1\n", &headless, options());

    machine.tick(0).unwrap();
    assert_eq!(machine.tick(100).unwrap(), MachineState::Waiting);
    assert!(!machine.button_state_changed(MouseButton::Left, true));

    headless.sound.set_wav_playing(2, false);
    assert_eq!(machine.tick(16).unwrap(), MachineState::Halted);
    assert_eq!(int(&machine, IntBank::A, 0), 1);
}

#[test]
fn interruptible_bgm_wait_ends_on_click() {
    let headless = Headless::new(20, 3);
    headless.sound.set_bgm_playing(true);
    let mut machine = build("4:1:0\n", &headless, options());
    machine.tick(0).unwrap();
    assert_eq!(machine.tick(100).unwrap(), MachineState::Waiting);
    assert!(machine.button_state_changed(MouseButton::Left, true));
    assert_eq!(machine.tick(16).unwrap(), MachineState::Halted);
}

#[test]
fn graphics_opcodes_use_their_rect_convention() {
    let headless = Headless::new(20, 3);
    let mut machine = build(
        "5:0:0 0, 0, 100, 50, 3\n5:0:1 0, 0, 100, 50\n5:1:0 2, 10, 20\n",
        &headless,
        options(),
    );
    assert_eq!(machine.tick(0).unwrap(), MachineState::Halted);
    assert_eq!(
        headless.graphics.log(),
        vec![
            "fill_rect [0, 0 101x51] color 3",
            "fill_rect [0, 0 100x50] color 0",
            "move_object 2 to (10, 20)",
        ]
    );
}

#[test]
fn variadic_sum_and_precompiled_expressions_see_live_state() {
    let headless = Headless::new(20, 3);
    let options = MachineOptions {
        precompile: true,
        ..options()
    };
    let mut machine = build(
        "3:0:0 intA[0], 5\n3:0:0 intA[1], intA[0] + 1\n3:2:0 intZ[0], intA[0], intA[1], 4\n3:2:0 intZ[1]\n",
        &headless,
        options,
    );
    assert_eq!(machine.tick(0).unwrap(), MachineState::Halted);
    assert_eq!(int(&machine, IntBank::A, 1), 6);
    assert_eq!(int(&machine, IntBank::Z, 0), 15);
    assert_eq!(int(&machine, IntBank::Z, 1), 0);
}

#[test]
fn precompile_rejects_malformed_instructions_up_front() {
    let headless = Headless::new(20, 3);
    let script = assemble("scenario", "0:0:0\n5:1:0 1, 2\n").unwrap();
    let options = MachineOptions {
        precompile: true,
        ..options()
    };
    let err = Machine::with_builtins(script, headless.collaborators(), options)
        .err()
        .expect("precompile error");
    assert!(matches!(err, MachineError::System { pc: 1, .. }));
}

#[test]
fn instruction_budget_yields_mid_script() {
    let headless = Headless::new(20, 3);
    let options = MachineOptions {
        max_instructions_per_tick: 2,
        ..options()
    };
    let mut machine = build(
        "3:1:0 intA[0], 1\n3:1:0 intA[0], 1\n3:1:0 intA[0], 1\n",
        &headless,
        options,
    );
    assert_eq!(machine.tick(0).unwrap(), MachineState::Running);
    assert_eq!(machine.pc(), 2);
    assert_eq!(machine.tick(0).unwrap(), MachineState::Halted);
    assert_eq!(int(&machine, IntBank::A, 0), 3);
}

#[test]
fn hard_reset_rewinds_without_hooks() {
    let headless = Headless::new(20, 3);
    let mut machine = build_with_counter("3:0:0 intA[0], 4\n9:0:0 500\n", &headless);
    machine.tick(0).unwrap();
    assert_eq!(machine.pc(), 1);
    assert_eq!(machine.stack().len(), 1);

    machine.hard_reset();
    assert!(machine.stack().is_empty());
    assert_eq!(machine.pc(), 0);
    assert_eq!(int(&machine, IntBank::A, 0), 0);
    assert_eq!(int(&machine, IntBank::B, 0), 0);

    assert_eq!(machine.tick(0).unwrap(), MachineState::Waiting);
    assert_eq!(int(&machine, IntBank::A, 0), 4);
}
