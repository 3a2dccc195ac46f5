use pretty_assertions::assert_eq;
use vn_bytecode::{assemble, decode_file, encode_file, format_script, BytecodeError, OpcodeKey};

const SOURCE: &str = r#"
# greeting
1:3:0 "Hello, \"world\""
1:20:0 intA[intB[1] + 2], 4
2:10:1 0, 0, 639, 479
1:0:0
"#;

#[test]
fn assembled_script_survives_the_binary_container() {
    let script = assemble("greeting", SOURCE).unwrap();
    let bytes = encode_file(&script).unwrap();
    let file = decode_file(&bytes).unwrap();
    assert_eq!(file.script, script);
    assert_eq!(file.script.instructions[2].key, OpcodeKey::new(2, 10, 1));
    assert_eq!(
        file.script.instructions[0].params,
        vec![r#""Hello, \"world\"""#.to_string()]
    );
}

#[test]
fn listing_is_stable() {
    let script = assemble("greeting", SOURCE).unwrap();
    let listing = format_script(&script);
    let reassembled = assemble("greeting", &listing).unwrap();
    assert_eq!(format_script(&reassembled), listing);
}

#[test]
fn truncated_payload_fails_to_decode() {
    let script = assemble("greeting", SOURCE).unwrap();
    let bytes = encode_file(&script).unwrap();
    let err = decode_file(&bytes[..bytes.len() - 3]).unwrap_err();
    assert!(matches!(err, BytecodeError::Decode(_)));
}
