//! Export → import → re-export through a project on disk.

#[path = "helpers/mod.rs"]
mod helpers;

use fmibridge::binding::{Causality, Variability};
use fmibridge::error::{BridgeError, ConflictError, ValidationError};
use fmibridge::model::{DeclType, Definition, Initializer, PortKind};
use fmibridge::{Annotation, Exporter, Importer, Role};
use helpers::*;
use rustc_hash::FxHashSet;

#[test]
fn test_export_assigns_dense_unique_references() {
    let artifact = Exporter::new(config()).export(&annotated_model()).unwrap();
    let desc = &artifact.description;

    let references: Vec<u32> = desc.variables.iter().map(|v| v.value_reference).collect();
    assert_eq!(references, vec![0, 1, 2, 3]);
    let unique: FxHashSet<u32> = references.iter().copied().collect();
    assert_eq!(unique.len(), references.len());

    for variable in &desc.variables {
        assert!(
            desc.links.get(variable.value_reference).is_some(),
            "'{}' has no link",
            variable.name
        );
    }
    assert_eq!(
        desc.link_for("valve").map(|q| q.as_str()),
        Some("HardwareInterface.valveState")
    );
    assert_eq!(desc.outputs, vec![4]);
    assert!(artifact.warnings.is_empty());
}

#[test]
fn test_export_document_formatting() {
    let artifact = Exporter::new(config()).export(&annotated_model()).unwrap();
    let xml = &artifact.text;

    assert!(xml.contains("name=\"minlevel\""));
    assert!(xml.contains("<Real start=\"1.0\"/>"));
    assert!(xml.contains("<Real start=\"2.0\"/>"));
    assert!(xml.contains("guid=\"{00000000-0000-0000-0000-000000000001}\""));
    assert!(xml.contains("<Unknown index=\"4\"/>"));
    assert!(xml.contains("<link valueReference=\"3\" name=\"HardwareInterface.valveState\"/>"));

    let min = artifact.description.variable("minlevel").unwrap();
    assert_eq!(min.causality, Some(Causality::Parameter));
    assert_eq!(min.variability, Some(Variability::Fixed));
    let valve = artifact.description.variable("valve").unwrap();
    assert!(valve.ty.start.is_none());
}

#[test]
fn test_roundtrip_into_stripped_model() {
    let exporter = Exporter::new(config());
    let artifact = exporter.export(&annotated_model()).unwrap();

    let (dir, mut project) = project(BARE_INTERFACE);
    let mut model = bare_model();
    let report = Importer::new(config())
        .import(&mut project, &model, "modelDescription.xml", artifact.text.as_bytes())
        .unwrap();

    assert_eq!(report.variables_read, 4);
    assert_eq!(report.synthesis.len(), 4);
    assert!(report.created().is_empty());

    let text = read(dir.path(), "HardwareInterface.vdmrt");
    assert!(text.starts_with("class HardwareInterface\nvalues\n"));
    assert!(text.contains("\tpublic maxlevel : RealPort = new RealPort(2.0);\n"));
    assert!(text.contains("\tpublic minlevel : RealPort = new RealPort(1.0);\n"));
    assert!(text.contains("\t-- @ interface: type = input, name=\"level\";\n"));
    assert!(text.contains("\tpublic level : RealPort := new RealPort(0.0);\n"));
    assert!(text.contains("\tpublic valve : BoolPort;\n"));
    assert!(text.ends_with("end HardwareInterface\n"));

    let values = text.find("values").unwrap();
    let inputs = text.find("public level").unwrap();
    let outputs = text.find("public valve").unwrap();
    assert!(values < inputs && inputs < outputs);

    // Re-export yields the same interface.
    report.apply_to(&mut model);
    let again = exporter.export(&model).unwrap();
    let names = |d: &fmibridge::ModelDescription| {
        d.variables
            .iter()
            .map(|v| (v.name.clone(), v.causality, v.ty.kind))
            .collect::<Vec<_>>()
    };
    assert_eq!(names(&again.description), names(&artifact.description));
}

#[test]
fn test_second_import_is_noop() {
    let artifact = Exporter::new(config()).export(&annotated_model()).unwrap();
    let (dir, mut project) = project(BARE_INTERFACE);
    let mut model = bare_model();
    let importer = Importer::new(config());

    let first = importer
        .import(&mut project, &model, "md.xml", artifact.text.as_bytes())
        .unwrap();
    first.apply_to(&mut model);
    let after_first = read(dir.path(), "HardwareInterface.vdmrt");

    let second = importer
        .import(&mut project, &model, "md.xml", artifact.text.as_bytes())
        .unwrap();
    assert!(second.is_noop());
    assert_eq!(second.already_bound.len(), 4);
    assert_eq!(read(dir.path(), "HardwareInterface.vdmrt"), after_first);
}

#[test]
fn test_import_into_annotated_model_changes_nothing() {
    let artifact = Exporter::new(config()).export(&annotated_model()).unwrap();
    let (dir, mut project) = project(INTERFACE);

    let report = Importer::new(config())
        .import(&mut project, &annotated_model(), "md.xml", artifact.text.as_bytes())
        .unwrap();
    assert!(report.is_noop());
    assert_eq!(read(dir.path(), "HardwareInterface.vdmrt"), INTERFACE);
}

#[test]
fn test_coverage_gate_leaves_files_untouched() {
    let doc = r#"<?xml version="1.0" encoding="UTF-8"?>
<fmiModelDescription fmiVersion="2.0" modelName="other">
  <ModelVariables>
    <ScalarVariable name="maxlevel" valueReference="0" causality="parameter"><Real start="3.0"/></ScalarVariable>
  </ModelVariables>
</fmiModelDescription>"#;
    let (dir, mut project) = project(INTERFACE);

    let err = Importer::new(config())
        .import(&mut project, &annotated_model(), "md.xml", doc.as_bytes())
        .unwrap_err();
    match err {
        BridgeError::Validation(ValidationError::ExtraInputs(missing)) => {
            assert_eq!(missing.len(), 1);
            assert_eq!(missing[0].name, "level");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(read(dir.path(), "HardwareInterface.vdmrt"), INTERFACE);
}

#[test]
fn test_import_start_values_are_normalized() {
    let doc = r#"<fmiModelDescription>
  <ModelVariables>
    <ScalarVariable name="gain" valueReference="0" causality="parameter"><Real start="1"/></ScalarVariable>
    <ScalarVariable name="enabled" valueReference="1" causality="parameter"><Boolean start="0"/></ScalarVariable>
    <ScalarVariable name="count" valueReference="2" causality="input"><Integer start="7"/></ScalarVariable>
    <ScalarVariable name="label" valueReference="3" causality="parameter"><String start="tank 1"/></ScalarVariable>
  </ModelVariables>
</fmiModelDescription>"#;
    let (dir, mut project) = project(BARE_INTERFACE);

    Importer::new(config())
        .import(&mut project, &bare_model(), "md.xml", doc.as_bytes())
        .unwrap();
    let text = read(dir.path(), "HardwareInterface.vdmrt");
    assert!(text.contains("public gain : RealPort = new RealPort(1.0);"));
    assert!(text.contains("public enabled : BoolPort = new BoolPort(false);"));
    assert!(text.contains("public count : IntPort := new IntPort(7);"));
    assert!(text.contains("public label : StringPort = new StringPort(\"tank 1\");"));
}

#[test]
fn test_import_skips_locals_and_sanitizes_names() {
    let doc = r#"<fmiModelDescription>
  <ModelVariables>
    <ScalarVariable name="tank.level-1" valueReference="0" causality="output"><Real/></ScalarVariable>
    <ScalarVariable name="scratch" valueReference="1" causality="local"><Real/></ScalarVariable>
    <ScalarVariable name="t" valueReference="2" causality="independent"><Real/></ScalarVariable>
  </ModelVariables>
</fmiModelDescription>"#;
    let (dir, mut project) = project(BARE_INTERFACE);

    let report = Importer::new(config())
        .import(&mut project, &bare_model(), "md.xml", doc.as_bytes())
        .unwrap();
    assert_eq!(report.synthesis.len(), 1);
    assert_eq!(report.skipped.len(), 2);

    let text = read(dir.path(), "HardwareInterface.vdmrt");
    assert!(text.contains("-- @ interface: type = output, name=\"tank.level-1\";"));
    assert!(text.contains("public tanklevel1 : RealPort;"));
    assert!(!text.contains("scratch"));
}

#[test]
fn test_duplicate_export_names_conflict() {
    let mut model = annotated_model();
    let interface = model
        .classes
        .iter_mut()
        .find(|c| c.name == "HardwareInterface")
        .unwrap();
    interface.definitions[1].annotation =
        Some(Annotation::new(Role::Parameter).with_name("maxlevel"));

    let err = Exporter::new(config()).export(&model).unwrap_err();
    assert!(matches!(
        err,
        BridgeError::Conflict(ConflictError::DuplicateName { ref name, .. }) if name == "maxlevel"
    ));
}

#[test]
fn test_import_creates_missing_scaffolding() {
    let artifact = Exporter::new(config()).export(&annotated_model()).unwrap();
    let dir = tempfile::tempdir().unwrap();
    let mut project = fmibridge::FsProject::new(dir.path());
    let mut model = fmibridge::Model::new("empty");

    let report = Importer::new(config())
        .import(&mut project, &model, "md.xml", artifact.text.as_bytes())
        .unwrap();

    let mut created: Vec<String> = report
        .created()
        .iter()
        .map(|p| p.display().to_string())
        .collect();
    created.sort();
    assert_eq!(
        created,
        vec![
            "HardwareInterface.vdmrt",
            "System.vdmrt",
            "World.vdmrt",
            "lib/Fmi.vdmrt"
        ]
    );

    let system = read(dir.path(), "System.vdmrt");
    assert!(system.contains("public static hwi: HardwareInterface := new HardwareInterface();"));
    let world = read(dir.path(), "World.vdmrt");
    assert!(world.contains("public run : () ==> ()"));
    let interface = read(dir.path(), "HardwareInterface.vdmrt");
    assert!(interface.contains("public valve : BoolPort;"));

    // The updated model now exports on its own.
    report.apply_to(&mut model);
    let again = Exporter::new(config()).export(&model).unwrap();
    assert_eq!(again.description.variables.len(), 4);
}

#[test]
fn test_provenance_headers() {
    let config = config().with_provenance(true);
    let artifact = Exporter::new(config.clone()).export(&annotated_model()).unwrap();
    let (dir, mut project) = project(BARE_INTERFACE);

    Importer::new(config)
        .import(&mut project, &bare_model(), "watertank.xml", artifact.text.as_bytes())
        .unwrap();
    let text = read(dir.path(), "HardwareInterface.vdmrt");
    assert!(text.starts_with("--"));
    assert!(text.contains("watertank.xml"));
    assert!(text.contains("fmi-bridge/test"));
    assert!(text.contains("class HardwareInterface\nvalues\n"));
}

#[test]
fn test_unreadable_interface_creates_no_scaffolding() {
    let artifact = Exporter::new(config()).export(&annotated_model()).unwrap();
    let (dir, mut project) = project(BARE_INTERFACE);
    std::fs::remove_file(dir.path().join("HardwareInterface.vdmrt")).unwrap();
    std::fs::remove_file(dir.path().join("lib/Fmi.vdmrt")).unwrap();

    // The model still knows the interface class but no longer the port library.
    let mut model = bare_model();
    model
        .classes
        .retain(|c| c.file != std::path::Path::new("lib/Fmi.vdmrt"));

    let err = Importer::new(config())
        .import(&mut project, &model, "md.xml", artifact.text.as_bytes())
        .unwrap_err();
    assert!(matches!(err, BridgeError::Io(_)));
    assert!(!dir.path().join("lib/Fmi.vdmrt").exists());
    assert!(!dir.path().join("HardwareInterface.vdmrt").exists());
}

#[test]
fn test_string_default_with_escapes_survives_roundtrip() {
    let mut model = annotated_model();
    let interface = model
        .classes
        .iter_mut()
        .find(|c| c.name == "HardwareInterface")
        .unwrap();
    interface.push_definition(
        Definition::value(
            "label",
            DeclType::Port(PortKind::String),
            Initializer::parse(r#"new StringPort("a\"b\\c")"#),
        )
        .with_annotation(Annotation::new(Role::Parameter).with_name("label")),
    );

    let exporter = Exporter::new(config());
    let artifact = exporter.export(&model).unwrap();
    let label = artifact.description.variable("label").unwrap();
    assert_eq!(label.ty.start.as_ref().unwrap().to_attribute(), r#"a"b\c"#);

    let (dir, mut project) = project(BARE_INTERFACE);
    let mut stripped = bare_model();
    let report = Importer::new(config())
        .import(&mut project, &stripped, "md.xml", artifact.text.as_bytes())
        .unwrap();
    let text = read(dir.path(), "HardwareInterface.vdmrt");
    assert!(text.contains(r#"public label : StringPort = new StringPort("a\"b\\c");"#));

    report.apply_to(&mut stripped);
    let again = exporter.export(&stripped).unwrap();
    assert_eq!(
        again.description.variable("label").unwrap().ty.start,
        label.ty.start
    );
}
