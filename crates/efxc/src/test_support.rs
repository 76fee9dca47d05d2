//! Shared fixtures for unit tests

use efx_sdk::{Codelist, FieldInfo, FieldType, NodeInfo, SdkVersion, SymbolTable};

fn field(id: &str, field_type: FieldType, element: &str) -> FieldInfo {
    FieldInfo::new(id, field_type, format!("/*/PathNode/{}", element)).with_parent_node("ND-Root")
}

fn codes(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

/// The fixture symbols, loaded for `sdk`
pub fn fixture_symbols_for(sdk: SdkVersion) -> SymbolTable {
    let mut table = SymbolTable::new(sdk);
    table.add_node(NodeInfo::new("ND-Root", "/*")).unwrap();

    let fields = [
        field("BT-00-Text", FieldType::Text, "TextField"),
        field("BT-00-Code", FieldType::Code, "CodeField").with_codelist("main-activity"),
        field("BT-00-Internal-Code", FieldType::InternalCode, "InternalCodeField")
            .with_codelist("main-activity"),
        field("BT-00-CodeAttribute", FieldType::Code, "CodeField/@attribute")
            .with_codelist("main-activity"),
        field("BT-00-Attribute", FieldType::Attribute, "TextField/@Attribute"),
        field("BT-00-Indicator", FieldType::Indicator, "IndicatorField"),
        field("BT-00-Number", FieldType::Number, "NumberField"),
        field("BT-00-Integer", FieldType::Number, "IntegerField"),
        field("BT-00-StartDate", FieldType::Date, "StartDateField"),
        field("BT-00-StartTime", FieldType::Time, "StartTimeField"),
        field("BT-00-Repeatable-Text", FieldType::Text, "RepeatableTextField").repeatable(true),
    ];
    for info in fields {
        table.add_field(info).unwrap();
    }

    table
        .add_codelist(Codelist::new(
            "main-activity",
            "1.2",
            sdk,
            codes(&["gas-oil", "port-rel", "rail"]),
        ))
        .unwrap();
    table
        .add_codelist(Codelist::new(
            "accessibility",
            "1.1",
            sdk,
            codes(&["inc", "n-inc", "n-inc-just"]),
        ))
        .unwrap();
    table
}

/// Fixture symbols for SDK 1.0
pub fn fixture_symbols() -> SymbolTable {
    fixture_symbols_for(SdkVersion::new(1, 0))
}

/// Fixture symbols for SDK 0.7
pub fn legacy_fixture_symbols() -> SymbolTable {
    fixture_symbols_for(SdkVersion::new(0, 7))
}
