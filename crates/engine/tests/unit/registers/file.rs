use pretty_assertions::assert_eq;
use rvisa_engine::common::RegisterError;
use rvisa_engine::config::Config;
use rvisa_engine::float::{Float32, Float64, Floating};
use rvisa_engine::machine::Machine;
use rvisa_engine::registers::integer::abi_name;
use rvisa_engine::registers::{RegisterId, RegisterKind, RegisterNotice};

#[test]
fn integer_names_resolve_by_number_abi_and_prefix() {
    let machine = Machine::new(&Config::default());
    let file = machine.integer_registers();
    assert_eq!(file.len(), 32);
    assert_eq!(file.register_by_name("t0"), Some(RegisterId(5)));
    assert_eq!(file.register_by_name("fp"), Some(RegisterId(8)));
    assert_eq!(file.register_by_name("s0"), Some(RegisterId(8)));
    assert_eq!(file.register_by_name("x31"), Some(RegisterId(31)));
    assert_eq!(file.register_by_name("x32"), None);
    assert_eq!(file.register_by_name("ft0"), None);
    assert_eq!(file.get(RegisterId(0)).kind(), RegisterKind::Hardwired);
    assert_eq!(abi_name(8), "s0");
    assert_eq!(abi_name(40), "?");
}

#[test]
fn stack_and_global_pointers_reset_to_the_layout() {
    let machine = Machine::new(&Config::default());
    assert_eq!(machine.register_value("sp"), Ok(0x7fff_effc));
    assert_eq!(machine.register_value("gp"), Ok(0x1000_8000));
    assert_eq!(machine.register_value("a0"), Ok(0));
    assert_eq!(machine.pc(), 0x0040_0000);
}

#[test]
fn x0_ignores_writes() {
    let mut machine = Machine::new(&Config::default());
    machine.set_x(0, 42);
    assert_eq!(machine.x(0), 0);
    assert_eq!(machine.set_register("zero", 7), Ok(0));
    assert_eq!(machine.x(0), 0);
}

#[test]
fn rv32_values_are_sign_extended() {
    let mut machine = Machine::new(&Config::default());
    machine.set_x(5, 0x8000_0000);
    assert_eq!(machine.x(5), 0xFFFF_FFFF_8000_0000);
    machine.set_x(6, 0x1_0000_0001);
    assert_eq!(machine.x(6), 1);

    let mut wide = Machine::new(&Config::rv64());
    wide.set_x(5, 0x8000_0000);
    assert_eq!(wide.x(5), 0x8000_0000);
}

#[test]
fn ordinary_writes_notify_backdoor_writes_do_not() {
    let mut machine = Machine::new(&Config::default());
    let listener = machine.integer_registers().add_registers_listener();
    listener.subscription().request(8);

    machine.set_x(5, 7);
    let _ = machine.set_register_backdoor("t1", 9).unwrap();
    assert_eq!(machine.x(6), 9);

    assert_eq!(
        listener.subscription().drain(),
        vec![RegisterNotice {
            name: "x5",
            number: Some(5),
            previous: 0,
            value: 7,
        }]
    );
}

#[test]
fn notices_need_credit() {
    let mut machine = Machine::new(&Config::default());
    let id = machine.integer_registers().resolve("a0").unwrap();
    let subscription = machine.integer_registers().get(id).subscribe();

    machine.set_x(10, 1);
    assert!(subscription.try_recv().is_none());

    subscription.request(1);
    machine.set_x(10, 2);
    machine.set_x(10, 3);
    let notices = subscription.drain();
    assert_eq!(notices.len(), 1);
    assert_eq!((notices[0].previous, notices[0].value), (1, 2));
    assert_eq!(subscription.credit(), 0);
}

#[test]
fn deleted_listener_stops_receiving() {
    let mut machine = Machine::new(&Config::default());
    let listener = machine.integer_registers().add_registers_listener();
    listener.subscription().request(8);
    machine.integer_registers().delete_registers_listener(&listener);
    machine.set_x(5, 1);
    assert!(listener.subscription().try_recv().is_none());
}

#[test]
fn unknown_names_are_errors() {
    let mut machine = Machine::new(&Config::default());
    assert_eq!(
        machine.register_value("x99"),
        Err(RegisterError::Unknown("x99".to_owned()))
    );
    assert!(machine.set_register("bogus", 1).is_err());
    assert!(machine.set_register_backdoor("bogus", 1).is_err());
}

#[test]
fn named_access_spans_all_files() {
    let mut machine = Machine::new(&Config::default());
    let _ = machine.set_register("fa0", Float64::from_f64(1.5).bits()).unwrap();
    assert_eq!(machine.f::<Float64>(10).to_f64(), 1.5);
    let _ = machine.set_register("uscratch", 0x1234).unwrap();
    assert_eq!(machine.register_value("uscratch"), Ok(0x1234));
}

#[test]
fn singles_are_nan_boxed_when_d_is_enabled() {
    let mut machine = Machine::new(&Config::default());
    machine.set_f(1, Float32::from_f32(2.0));
    assert_eq!(machine.f_raw(1), 0xFFFF_FFFF_4000_0000);
    assert_eq!(machine.f::<Float32>(1).to_f32(), 2.0);

    // An improperly boxed image reads as the canonical NaN.
    machine.set_f_raw(2, 0x0000_0000_4000_0000);
    assert_eq!(machine.f::<Float32>(2), Float32::nan());
}

#[test]
fn singles_are_unboxed_without_d() {
    let config =
        Config::from_json(r#"{ "general": { "extensions": { "d": false } } }"#).unwrap();
    let mut machine = Machine::new(&config);
    machine.set_f(1, Float32::from_f32(2.0));
    assert_eq!(machine.f_raw(1), 0x4000_0000);
}

#[test]
fn reset_restores_defaults_silently() {
    let mut machine = Machine::new(&Config::default());
    machine.set_x(2, 0);
    machine.set_x(5, 99);
    machine.set_f_raw(3, 0x42);
    machine.set_pc(0x0040_0100);

    let listener = machine.integer_registers().add_registers_listener();
    listener.subscription().request(64);
    machine.reset();

    assert_eq!(machine.x(2), 0x7fff_effc);
    assert_eq!(machine.x(5), 0);
    assert_eq!(machine.f_raw(3), 0);
    assert_eq!(machine.pc(), 0x0040_0000);
    assert!(listener.subscription().try_recv().is_none());
}

#[test]
fn display_lists_every_register() {
    let machine = Machine::new(&Config::default());
    let dump = machine.integer_registers().to_string();
    assert_eq!(dump.lines().count(), 32);
    assert!(dump.lines().nth(2).unwrap().starts_with("x2"));
}
