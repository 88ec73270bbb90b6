use lupine::tiny::parse_lines;
use lupine::{LocalSource, MappingSource};

fn sample_source() -> LocalSource {
    let parsed = parse_lines([
        "CLASS\tabc\tnet/minecraft/class_123\tnet/minecraft/entity/PlayerEntity",
        "CLASS\tdmx\tnet/minecraft/class_4587\tnet/minecraft/util/MatrixStack",
        "CLASS\tdmx$a\tnet/minecraft/class_4587$class_4588\tnet/minecraft/util/MatrixStack$Entry",
        "CLASS\tzzz\tnet/minecraft/class_9000\tnet/minecraft/util/MatrixStackFrame",
        "FIELD\tdmx\tLjava/util/Deque;\ta\tfield_21864\tstacks",
        "METHOD\tdmx\t()V\tb\tmethod_22903\tpush",
        "METHOD\tzzz\t()V\ta\tmethod_22904\tgrow",
    ]);

    let mut source = LocalSource::new();
    source.insert_mappings(parsed);
    source
}

// ---------------------------------------------------------------------------
// Point lookups
// ---------------------------------------------------------------------------

#[test]
fn class_lookup_matches_the_short_intermediary_name() {
    let source = sample_source();

    let top = source.class_by_intermediary("class_4587").unwrap().unwrap();
    assert_eq!(top.mapped_name, "MatrixStack");

    // Nested classes are found by the trailing segment alone.
    let nested = source.class_by_intermediary("class_4588").unwrap().unwrap();
    assert_eq!(nested.mapped_name, "MatrixStack$Entry");
}

#[test]
fn member_lookup_requires_the_full_intermediary_name() {
    let source = sample_source();

    let field = source.field_by_intermediary("field_21864").unwrap().unwrap();
    assert_eq!(field.mapped_name, "stacks");

    let method = source
        .method_by_intermediary("method_22903")
        .unwrap()
        .unwrap();
    assert_eq!(method.mapped_name, "push");

    assert!(source.field_by_intermediary("21864").unwrap().is_none());
}

#[test]
fn official_lookups_are_exact() {
    let source = sample_source();

    assert_eq!(
        source
            .class_by_official("dmx")
            .unwrap()
            .unwrap()
            .mapped_name,
        "MatrixStack"
    );
    assert_eq!(
        source
            .field_by_official("a")
            .unwrap()
            .unwrap()
            .mapped_name,
        "stacks"
    );
    assert_eq!(
        source
            .method_by_official("b")
            .unwrap()
            .unwrap()
            .mapped_name,
        "push"
    );
    assert!(source.class_by_official("nope").unwrap().is_none());
}

// ---------------------------------------------------------------------------
// Search
// ---------------------------------------------------------------------------

#[test]
fn search_matches_classes_by_any_name_form() {
    let source = sample_source();

    for name in ["dmx", "class_4587", "MatrixStack"] {
        let found = source.search(name).unwrap();
        assert_eq!(found.len(), 1, "name={name}");
        assert_eq!(found[0].mapped_name, "MatrixStack");
    }
}

#[test]
fn search_does_not_match_members_by_official_name() {
    let source = sample_source();

    // "a" is the official name of a field and a method, and official
    // names are not distinguishing for members.
    assert!(source.search("a").unwrap().is_empty());

    let by_intermediary = source.search("field_21864").unwrap();
    assert_eq!(by_intermediary.len(), 1);

    let by_mapped = source.search("push").unwrap();
    assert_eq!(by_mapped.len(), 1);
}

// ---------------------------------------------------------------------------
// Children
// ---------------------------------------------------------------------------

#[test]
fn children_resolves_the_parent_by_any_name_form() {
    let source = sample_source();

    for name in ["class_4587", "MatrixStack", "dmx"] {
        let children = source.children(name).unwrap();
        let mapped: Vec<&str> = children.iter().map(|rec| rec.mapped_name.as_str()).collect();
        assert_eq!(
            mapped,
            vec!["MatrixStack$Entry", "stacks", "push"],
            "name={name}"
        );
    }
}

#[test]
fn nested_classes_match_on_the_mapped_name_pattern_only() {
    let source = sample_source();

    let children = source.children("MatrixStack").unwrap();

    // "MatrixStack$Entry" is a child; "MatrixStackFrame" merely shares a
    // prefix and is not.
    assert!(children.iter().any(|rec| rec.mapped_name == "MatrixStack$Entry"));
    assert!(!children.iter().any(|rec| rec.mapped_name == "MatrixStackFrame"));
}

#[test]
fn children_of_a_leaf_class_is_empty_not_missing() {
    let source = sample_source();

    let children = source.children("PlayerEntity").unwrap();
    assert!(children.is_empty());
}

#[test]
fn children_of_an_unknown_name_is_empty() {
    let source = sample_source();

    assert!(source.children("Unknown").unwrap().is_empty());
}
