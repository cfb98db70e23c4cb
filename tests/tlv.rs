//! Struct-to-TLV conversion with exact wire layout checks.

use fieldwire::{
    convert_tlv, impl_struct_view, FieldPath, KeyName, MappingRule, RuleSet, TlvWriter,
    RECORD_HEADER_LEN,
};

fn header(bytes: &[u8], offset: usize) -> (u32, usize) {
    let tag = u32::from_ne_bytes(bytes[offset..offset + 4].try_into().unwrap());
    let len = u32::from_ne_bytes(bytes[offset + 4..offset + 8].try_into().unwrap());
    (tag, len as usize)
}

fn value(bytes: &[u8], offset: usize) -> &[u8] {
    let (_, len) = header(bytes, offset);
    &bytes[offset + RECORD_HEADER_LEN..offset + RECORD_HEADER_LEN + len]
}

#[test]
fn append_buf_wire_layout() {
    let mut writer = TlvWriter::new();
    writer.append_buf(0x1001, b"Hello");

    assert_eq!(writer.len(), 13);
    let bytes = writer.as_bytes();
    let (tag, len) = header(bytes, 0);
    assert_eq!(tag, 0x1001);
    assert_eq!(len, 5);
    assert_eq!(value(bytes, 0), b"Hello");
}

#[test]
fn arithmetic_fields_carry_native_bytes() {
    struct Reading {
        count: i32,
        ratio: f64,
        flag: bool,
    }
    impl_struct_view!(Reading { 0 => count: i32, 1 => ratio: f64, 2 => flag: bool });

    let src = Reading {
        count: -7,
        ratio: 4.56,
        flag: true,
    };
    let rules = RuleSet::new(vec![
        MappingRule::TlvBinary {
            src: FieldPath::new([0]),
            tag: 0x2001,
            key: None,
        },
        MappingRule::TlvBinary {
            src: FieldPath::new([1]),
            tag: 0x2002,
            key: None,
        },
        MappingRule::TlvBinary {
            src: FieldPath::new([2]),
            tag: 0x2003,
            key: None,
        },
    ]);
    rules.validate_tlv(&src).unwrap();

    let mut writer = TlvWriter::new();
    convert_tlv(&src, &mut writer, &rules);

    let bytes = writer.as_bytes();
    assert_eq!(writer.len(), (8 + 4) + (8 + 8) + (8 + 1));

    let (tag, len) = header(bytes, 0);
    assert_eq!((tag, len), (0x2001, 4));
    assert_eq!(value(bytes, 0), (-7i32).to_ne_bytes());

    let (tag, len) = header(bytes, 12);
    assert_eq!((tag, len), (0x2002, 8));
    assert_eq!(value(bytes, 12), 4.56f64.to_ne_bytes());

    let (tag, len) = header(bytes, 28);
    assert_eq!((tag, len), (0x2003, 1));
    assert_eq!(value(bytes, 28), [1]);
}

#[test]
fn text_fields_carry_a_nul_terminator() {
    struct Labeled {
        name: String,
        code: [u8; 8],
    }
    impl_struct_view!(Labeled { 0 => name: str, 1 => code: char_buf });

    let mut code = [0u8; 8];
    code[..3].copy_from_slice(b"abc");
    let src = Labeled {
        name: "hello".to_string(),
        code,
    };
    let rules = RuleSet::new(vec![
        MappingRule::TlvBinary {
            src: FieldPath::new([0]),
            tag: 0x3001,
            key: None,
        },
        MappingRule::TlvBinary {
            src: FieldPath::new([1]),
            tag: 0x3002,
            key: None,
        },
    ]);
    rules.validate_tlv(&src).unwrap();

    let mut writer = TlvWriter::new();
    convert_tlv(&src, &mut writer, &rules);

    let bytes = writer.as_bytes();
    let (tag, len) = header(bytes, 0);
    assert_eq!((tag, len), (0x3001, 6));
    assert_eq!(value(bytes, 0), b"hello\0");

    // char buffers contribute text up to the first NUL, not the raw capacity
    let (tag, len) = header(bytes, 14);
    assert_eq!((tag, len), (0x3002, 4));
    assert_eq!(value(bytes, 14), b"abc\0");
}

#[test]
fn blob_fields_carry_raw_bytes() {
    struct Packet {
        payload: Vec<u8>,
    }
    impl_struct_view!(Packet { 0 => payload: bytes });

    let src = Packet {
        payload: vec![0xDE, 0xAD, 0x00, 0xBE, 0xEF],
    };
    let rules = RuleSet::new(vec![MappingRule::TlvBinary {
        src: FieldPath::new([0]),
        tag: 0x4001,
        key: None,
    }]);
    rules.validate_tlv(&src).unwrap();

    let mut writer = TlvWriter::new();
    convert_tlv(&src, &mut writer, &rules);

    let (tag, len) = header(writer.as_bytes(), 0);
    assert_eq!((tag, len), (0x4001, 5));
    assert_eq!(value(writer.as_bytes(), 0), [0xDE, 0xAD, 0x00, 0xBE, 0xEF]);
}

#[test]
fn digital_strings_carry_decimal_text_without_nul() {
    struct Counters {
        big: i64,
        small: u16,
        ratio: f32,
    }
    impl_struct_view!(Counters { 0 => big: i64, 1 => small: u16, 2 => ratio: f32 });

    let src = Counters {
        big: -1234567890,
        small: 42,
        ratio: 2.5,
    };
    let rules = RuleSet::new(vec![
        MappingRule::TlvDigitalString {
            src: FieldPath::new([0]),
            tag: 0x5001,
            key: None,
        },
        MappingRule::TlvDigitalString {
            src: FieldPath::new([1]),
            tag: 0x5002,
            key: None,
        },
        MappingRule::TlvDigitalString {
            src: FieldPath::new([2]),
            tag: 0x5003,
            key: None,
        },
    ]);
    rules.validate_tlv(&src).unwrap();

    let mut writer = TlvWriter::new();
    convert_tlv(&src, &mut writer, &rules);

    let bytes = writer.as_bytes();
    let (tag, len) = header(bytes, 0);
    assert_eq!((tag, len), (0x5001, 11));
    assert_eq!(value(bytes, 0), b"-1234567890");

    let next = 8 + 11;
    let (tag, len) = header(bytes, next);
    assert_eq!((tag, len), (0x5002, 2));
    assert_eq!(value(bytes, next), b"42");

    let last = next + 8 + 2;
    let (tag, len) = header(bytes, last);
    assert_eq!((tag, len), (0x5003, 3));
    assert_eq!(value(bytes, last), b"2.5");
}

#[test]
fn keyed_records_prefix_key_and_nul() {
    struct Reading {
        count: i32,
    }
    impl_struct_view!(Reading { 0 => count: i32 });

    let src = Reading { count: 99 };
    let rules = RuleSet::new(vec![
        MappingRule::TlvBinary {
            src: FieldPath::new([0]),
            tag: 0x6001,
            key: Some(KeyName::new("count").unwrap()),
        },
        MappingRule::TlvDigitalString {
            src: FieldPath::new([0]),
            tag: 0x6002,
            key: Some(KeyName::new("count").unwrap()),
        },
    ]);
    rules.validate_tlv(&src).unwrap();

    let mut writer = TlvWriter::new();
    convert_tlv(&src, &mut writer, &rules);

    let bytes = writer.as_bytes();
    let (tag, len) = header(bytes, 0);
    assert_eq!((tag, len), (0x6001, 6 + 4));
    let mut expected = b"count\0".to_vec();
    expected.extend_from_slice(&99i32.to_ne_bytes());
    assert_eq!(value(bytes, 0), expected);

    let next = 8 + 10;
    let (tag, len) = header(bytes, next);
    assert_eq!((tag, len), (0x6002, 6 + 2));
    assert_eq!(value(bytes, next), b"count\099");
}

#[test]
fn sub_struct_nests_a_complete_record_stream() {
    struct Sub {
        int_field: i32,
        double_field: f64,
    }
    struct Parent {
        sub_data: Sub,
    }
    impl_struct_view!(Sub { 0 => int_field: i32, 1 => double_field: f64 });
    impl_struct_view!(Parent { 0 => sub_data: struct });

    let src = Parent {
        sub_data: Sub {
            int_field: 123,
            double_field: 4.56,
        },
    };
    let sub_rules = RuleSet::new(vec![
        MappingRule::TlvBinary {
            src: FieldPath::new([0]),
            tag: 0x9002,
            key: None,
        },
        MappingRule::TlvBinary {
            src: FieldPath::new([1]),
            tag: 0x9003,
            key: None,
        },
    ]);
    let rules = RuleSet::new(vec![MappingRule::TlvSubStruct {
        src: FieldPath::new([0]),
        tag: 0x9001,
        rules: sub_rules,
        key: None,
    }]);
    rules.validate_tlv(&src).unwrap();

    let mut writer = TlvWriter::new();
    convert_tlv(&src, &mut writer, &rules);

    // inner stream: (8 + 4) + (8 + 8) = 28; outer record: 8 + 28 = 36
    assert_eq!(writer.len(), 36);

    let bytes = writer.as_bytes();
    let (tag, len) = header(bytes, 0);
    assert_eq!((tag, len), (0x9001, 28));

    let inner = value(bytes, 0);
    let (tag, len) = header(inner, 0);
    assert_eq!((tag, len), (0x9002, 4));
    assert_eq!(value(inner, 0), 123i32.to_ne_bytes());

    let (tag, len) = header(inner, 12);
    assert_eq!((tag, len), (0x9003, 8));
    assert_eq!(value(inner, 12), 4.56f64.to_ne_bytes());
}

#[test]
fn keyed_sub_struct_prefixes_the_inner_stream() {
    struct Sub {
        int_field: i32,
        double_field: f64,
    }
    struct Parent {
        sub_data: Sub,
    }
    impl_struct_view!(Sub { 0 => int_field: i32, 1 => double_field: f64 });
    impl_struct_view!(Parent { 0 => sub_data: struct });

    let src = Parent {
        sub_data: Sub {
            int_field: 789,
            double_field: 1.23,
        },
    };
    let sub_rules = RuleSet::new(vec![
        MappingRule::TlvBinary {
            src: FieldPath::new([0]),
            tag: 0xA002,
            key: None,
        },
        MappingRule::TlvBinary {
            src: FieldPath::new([1]),
            tag: 0xA003,
            key: None,
        },
    ]);
    let rules = RuleSet::new(vec![MappingRule::TlvSubStruct {
        src: FieldPath::new([0]),
        tag: 0xA001,
        rules: sub_rules,
        key: Some(KeyName::new("subData").unwrap()),
    }]);
    rules.validate_tlv(&src).unwrap();

    let mut writer = TlvWriter::new();
    convert_tlv(&src, &mut writer, &rules);

    // key "subData" plus NUL is 8 bytes; outer value = 8 + 28 = 36; total 44
    assert_eq!(writer.len(), 44);

    let bytes = writer.as_bytes();
    let (tag, len) = header(bytes, 0);
    assert_eq!((tag, len), (0xA001, 36));

    let outer_value = value(bytes, 0);
    assert_eq!(&outer_value[..8], b"subData\0");

    let inner = &outer_value[8..];
    let (tag, len) = header(inner, 0);
    assert_eq!((tag, len), (0xA002, 4));
    assert_eq!(value(inner, 0), 789i32.to_ne_bytes());
    let (tag, len) = header(inner, 12);
    assert_eq!((tag, len), (0xA003, 8));
    assert_eq!(value(inner, 12), 1.23f64.to_ne_bytes());
}

#[test]
fn empty_sub_struct_still_emits_the_outer_record() {
    struct Sub {
        unused: i32,
    }
    struct Parent {
        sub_data: Sub,
    }
    impl_struct_view!(Sub { 0 => unused: i32 });
    impl_struct_view!(Parent { 0 => sub_data: struct });

    let src = Parent {
        sub_data: Sub { unused: 0 },
    };
    let rules = RuleSet::new(vec![MappingRule::TlvSubStruct {
        src: FieldPath::new([0]),
        tag: 0xB001,
        rules: RuleSet::new(vec![]),
        key: None,
    }]);

    let mut writer = TlvWriter::new();
    convert_tlv(&src, &mut writer, &rules);

    assert_eq!(writer.len(), RECORD_HEADER_LEN);
    let (tag, len) = header(writer.as_bytes(), 0);
    assert_eq!((tag, len), (0xB001, 0));
}

#[test]
fn record_stream_walks_by_header_hops() {
    struct Mixed {
        a: u32,
        b: String,
        c: i64,
    }
    impl_struct_view!(Mixed { 0 => a: u32, 1 => b: str, 2 => c: i64 });

    let src = Mixed {
        a: 1,
        b: "two".to_string(),
        c: 3,
    };
    let rules = RuleSet::new(vec![
        MappingRule::TlvBinary {
            src: FieldPath::new([0]),
            tag: 10,
            key: None,
        },
        MappingRule::TlvBinary {
            src: FieldPath::new([1]),
            tag: 11,
            key: None,
        },
        MappingRule::TlvDigitalString {
            src: FieldPath::new([2]),
            tag: 12,
            key: None,
        },
    ]);
    let mut writer = TlvWriter::new();
    convert_tlv(&src, &mut writer, &rules);

    let bytes = writer.as_bytes();
    let mut offset = 0;
    let mut tags = Vec::new();
    while offset < bytes.len() {
        let (tag, len) = header(bytes, offset);
        tags.push(tag);
        offset += RECORD_HEADER_LEN + len;
    }
    assert_eq!(offset, bytes.len());
    assert_eq!(tags, [10, 11, 12]);
}

#[test]
fn validation_rejects_struct_rules_against_a_writer() {
    struct Sub {
        x: i32,
    }
    struct Parent {
        sub: Sub,
    }
    impl_struct_view!(Sub { 0 => x: i32 });
    impl_struct_view!(Parent { 0 => sub: struct });

    let src = Parent { sub: Sub { x: 0 } };

    // a struct-destination rule has no meaning for TLV output
    let rules = RuleSet::new(vec![MappingRule::Default {
        src: FieldPath::new([0, 0]),
        dst: FieldPath::new([0, 0]),
    }]);
    assert!(rules.validate_tlv(&src).is_err());

    // a binary record cannot carry a whole nested struct
    let rules = RuleSet::new(vec![MappingRule::TlvBinary {
        src: FieldPath::new([0]),
        tag: 1,
        key: None,
    }]);
    assert!(rules.validate_tlv(&src).is_err());

    // digital strings require numeric sources
    struct Named {
        name: String,
    }
    impl_struct_view!(Named { 0 => name: str });
    let named = Named {
        name: String::new(),
    };
    let rules = RuleSet::new(vec![MappingRule::TlvDigitalString {
        src: FieldPath::new([0]),
        tag: 2,
        key: None,
    }]);
    assert!(rules.validate_tlv(&named).is_err());
}
