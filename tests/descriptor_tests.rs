use vtrewrite::config::Config;
use vtrewrite::types::{
    make_basic_type_descriptor, make_dst_descriptor, make_method_descriptor, make_src_descriptor, parse_field,
    parse_method, parse_method_into, parse_type, Carrier, DescriptorError, Kind, MethodDescriptorCache,
    NoValueTypes, Strategy, TypeId, ValueTypeLookup, ValueTypeRegistry,
};

fn registry() -> ValueTypeRegistry {
    let mut reg = ValueTypeRegistry::new();
    reg.register("demo.Money", Carrier::Wide).unwrap();
    reg.register("demo/Flag", Carrier::Narrow).unwrap();
    reg
}

#[test]
fn format_then_parse_is_identity_for_plain_types() {
    let kinds = [Kind::I32, Kind::I64, Kind::F32, Kind::F64, Kind::ObjectRef];
    for kind in kinds {
        for depth in [0, 1, 2, 7, 255] {
            let ty = TypeId::new(kind, depth).unwrap();
            let desc = make_src_descriptor(ty);
            assert_eq!(parse_field(&desc, &NoValueTypes).unwrap(), ty, "{}", desc);
        }
    }
    assert_eq!(parse_type("V", 0, &NoValueTypes).unwrap(), (TypeId::VOID, 1));
}

#[test]
fn narrow_primitive_codes_collapse_to_i32() {
    for code in ["I", "Z", "S", "B", "C"] {
        assert_eq!(parse_field(code, &NoValueTypes).unwrap(), TypeId::I32);
    }
    assert_eq!(make_src_descriptor(parse_field("[[Z", &NoValueTypes).unwrap()), "[[I");
}

#[test]
fn value_types_come_from_the_lookup() {
    let reg = registry();
    let money = parse_field("Ldemo/Money;", &reg).unwrap();
    assert_eq!(money.value_type_index(), Some(0));
    assert!(!money.is_src64());
    assert!(money.is_dst64());

    let flags = parse_field("[[Ldemo/Flag;", &reg).unwrap();
    assert_eq!(flags.array_depth(), 2);
    assert_eq!(flags.value_type_index(), Some(1));
    assert_eq!(make_dst_descriptor(flags), "[[I");
    assert_eq!(make_src_descriptor(money.array_from().unwrap()), "[J");
    assert_eq!(make_basic_type_descriptor(flags), "I");

    // unknown classes stay references
    assert_eq!(parse_field("Ldemo/Other;", &reg).unwrap(), TypeId::OBJECT);
    assert_eq!(reg.class_name(1), Some("demo/Flag"));
}

#[test]
fn closures_work_as_lookups() {
    let vt = TypeId::value_type(4, Carrier::Wide).unwrap();
    let lookup = move |name: &str| if name == "p/Id" { Some(vt) } else { None };
    assert_eq!(parse_field("Lp/Id;", &lookup).unwrap(), vt);
    assert_eq!(lookup.strategy("p/Id", "of", "(J)Lp/Id;"), None);
}

#[test]
fn parse_type_reports_next_position() {
    let desc = "IJ[Ljava/lang/String;D";
    let mut pos = 0;
    let mut seen = Vec::new();
    while pos < desc.len() {
        let (ty, next) = parse_type(desc, pos, &NoValueTypes).unwrap();
        seen.push(ty);
        pos = next;
    }
    assert_eq!(
        seen,
        vec![TypeId::I32, TypeId::I64, TypeId::OBJECT.array_from().unwrap(), TypeId::F64]
    );
}

#[test]
fn method_buffer_gets_return_first() {
    let reg = registry();
    let mut out = vec![TypeId::F32];
    let n = parse_method_into(&mut out, "(ILdemo/Money;[D)Ldemo/Flag;", &reg).unwrap();
    assert_eq!(n, 3);
    assert_eq!(out.len(), 5);
    assert_eq!(out[0], TypeId::F32);
    assert_eq!(out[1].value_type_index(), Some(1));
    assert_eq!(out[2], TypeId::I32);
    assert_eq!(out[4], TypeId::F64.array_from().unwrap());

    let sig = parse_method("(ILdemo/Money;J)V", &reg).unwrap();
    assert_eq!(sig.ret, TypeId::VOID);
    assert_eq!(sig.arg_src_words(), 4);
    assert_eq!(sig.arg_dst_words(), 5);
    assert!(sig.has_value_types());
    assert_eq!(make_method_descriptor(sig.ret, &sig.args), "(IJJ)V");
}

#[test]
fn malformed_descriptors_are_rejected() {
    let cases: [(&str, fn(&DescriptorError) -> bool); 7] = [
        ("", |e| matches!(e, DescriptorError::UnexpectedEnd { .. })),
        ("Q", |e| matches!(e, DescriptorError::UnknownTypeCode { code: 'Q', .. })),
        ("Ljava/lang/String", |e| matches!(e, DescriptorError::UnterminatedClassName { .. })),
        ("L;", |e| matches!(e, DescriptorError::EmptyClassName { .. })),
        ("[V", |e| matches!(e, DescriptorError::MisplacedVoid { .. })),
        ("II", |e| matches!(e, DescriptorError::TrailingCharacters { position: 1, .. })),
        ("V", |e| matches!(e, DescriptorError::MisplacedVoid { .. })),
    ];
    for (desc, expected) in cases {
        let err = parse_field(desc, &NoValueTypes).unwrap_err();
        assert!(expected(&err), "{}: {:?}", desc, err);
    }

    let method_cases = ["II)V", "(II", "(V)V", "(I)", "(I)VV"];
    for desc in method_cases {
        let mut out = vec![TypeId::I64];
        assert!(parse_method_into(&mut out, desc, &NoValueTypes).is_err(), "{}", desc);
        assert_eq!(out, vec![TypeId::I64], "{} must leave the buffer alone", desc);
    }

    let too_deep = format!("{}I", "[".repeat(256));
    assert!(matches!(
        parse_field(&too_deep, &NoValueTypes).unwrap_err(),
        DescriptorError::InvalidType { .. }
    ));
}

#[test]
fn cache_counts_hits_and_misses() {
    let reg = registry();
    let mut cache = MethodDescriptorCache::new(&Config::default());
    for _ in 0..3 {
        cache.parse("(Ldemo/Money;)V", &reg).unwrap();
    }
    cache.parse("()J", &reg).unwrap();
    assert!(cache.parse("(", &reg).is_err());
    let stats = cache.finish();
    assert_eq!(stats.hits, 2);
    assert_eq!(stats.misses, 3);
    assert_eq!(stats.entries, 2);

    let mut off = MethodDescriptorCache::new(&Config::default().with_method_cache(false));
    off.parse("()J", &reg).unwrap();
    off.parse("()J", &reg).unwrap();
    assert_eq!(off.stats().hits, 0);
    assert_eq!(off.stats().entries, 0);
}

#[test]
fn strategies_are_registered_per_operation() {
    let mut reg = registry();
    reg.register_op("demo.Money", "plus", "(Ldemo/Money;)Ldemo/Money;", Strategy::Arithmetic);
    assert_eq!(
        reg.strategy("demo/Money", "plus", "(Ldemo/Money;)Ldemo/Money;"),
        Some(Strategy::Arithmetic)
    );
    assert_eq!(reg.strategy("demo/Money", "minus", "(Ldemo/Money;)Ldemo/Money;"), None);
    assert_eq!("copyArray".parse::<Strategy>().unwrap(), Strategy::CopyArray);
    assert!("reflect".parse::<Strategy>().is_err());
}
