//! Shared fixtures: a water tank controller model and its sources.

#![allow(dead_code)]

use std::path::Path;

use fmibridge::model::{ClassDef, DeclType, Definition, Initializer, PortKind};
use fmibridge::{Annotation, BridgeConfig, FsProject, Model, ModelDescriptionConfig, Role};
use tempfile::TempDir;

pub const WORLD: &str = "class World\n\noperations\n\npublic run : () ==> ()\nrun() == skip;\n\nend World\n";

pub const SYSTEM: &str = "system System\n\ninstance variables\n\n\tpublic static hwi: HardwareInterface := new HardwareInterface();\n\nend System\n";

pub const PORTS: &str = "class Port\nend Port\nclass RealPort is subclass of Port\nend RealPort\nclass IntPort is subclass of Port\nend IntPort\nclass BoolPort is subclass of Port\nend BoolPort\nclass StringPort is subclass of Port\nend StringPort\n";

pub const INTERFACE: &str = r#"class HardwareInterface

values
	-- @ interface: type = parameter, name="maxlevel";
	public maxlevel : RealPort = new RealPort(2.0);
	-- @ interface: type = parameter, name="minlevel";
	public minlevel : RealPort = new RealPort(1);

instance variables
	-- @ interface: type = input, name="level";
	public level : RealPort := new RealPort(0.0);
	-- @ interface: type = output, name="valve";
	public valveState : BoolPort := new BoolPort(false);

end HardwareInterface
"#;

pub const BARE_INTERFACE: &str = "class HardwareInterface\n\nend HardwareInterface\n";

pub fn config() -> BridgeConfig {
    BridgeConfig::new()
        .with_tool_id("fmi-bridge/test")
        .with_description(
            ModelDescriptionConfig::new("watertank")
                .with_guid("{00000000-0000-0000-0000-000000000001}"),
        )
}

fn real_port(arg: &str) -> Initializer {
    Initializer::construct("RealPort", vec![arg.to_string()])
}

fn structure(interface: ClassDef, interface_text: &str) -> Model {
    let mut model = Model::new("watertank")
        .with_class(
            ClassDef::new("World", "World.vdmrt")
                .with_definition(Definition::operation("run"))
                .locate_in(WORLD)
                .expect("World header"),
        )
        .with_class(
            interface
                .locate_in(interface_text)
                .expect("HardwareInterface header"),
        )
        .with_class(
            ClassDef::system("System", "System.vdmrt")
                .with_definition(
                    Definition::instance_variable(
                        "hwi",
                        DeclType::Named("HardwareInterface".into()),
                        Some(Initializer::construct("HardwareInterface", vec![])),
                    )
                    .into_static(),
                )
                .locate_in(SYSTEM)
                .expect("System header"),
        )
        .with_class(ClassDef::new("Port", "lib/Fmi.vdmrt"));
    for kind in PortKind::ALL {
        model = model.with_class(ClassDef::new(kind.class_name(), "lib/Fmi.vdmrt"));
    }
    model
}

/// The annotated controller, matching [`INTERFACE`].
pub fn annotated_model() -> Model {
    let interface = ClassDef::new("HardwareInterface", "HardwareInterface.vdmrt")
        .with_definition(
            Definition::value("maxlevel", DeclType::Port(PortKind::Real), real_port("2.0"))
                .with_annotation(Annotation::new(Role::Parameter).with_name("maxlevel")),
        )
        .with_definition(
            Definition::value("minlevel", DeclType::Port(PortKind::Real), real_port("1"))
                .with_annotation(Annotation::new(Role::Parameter).with_name("minlevel")),
        )
        .with_definition(
            Definition::instance_variable(
                "level",
                DeclType::Port(PortKind::Real),
                Some(real_port("0.0")),
            )
            .with_annotation(Annotation::new(Role::Input).with_name("level")),
        )
        .with_definition(
            Definition::instance_variable(
                "valveState",
                DeclType::Port(PortKind::Bool),
                Some(Initializer::construct("BoolPort", vec!["false".to_string()])),
            )
            .with_annotation(Annotation::new(Role::Output).with_name("valve")),
        );
    structure(interface, INTERFACE)
}

/// The same model with the interface class emptied.
pub fn bare_model() -> Model {
    structure(
        ClassDef::new("HardwareInterface", "HardwareInterface.vdmrt"),
        BARE_INTERFACE,
    )
}

pub fn write(root: &Path, path: &str, text: &str) {
    let full = root.join(path);
    if let Some(parent) = full.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(full, text).unwrap();
}

/// A project on disk holding the sources of the model, with `interface`
/// as the interface class file.
pub fn project(interface: &str) -> (TempDir, FsProject) {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "World.vdmrt", WORLD);
    write(dir.path(), "System.vdmrt", SYSTEM);
    write(dir.path(), "lib/Fmi.vdmrt", PORTS);
    write(dir.path(), "HardwareInterface.vdmrt", interface);
    let project = FsProject::new(dir.path()).with_name("watertank");
    (dir, project)
}

pub fn read(root: &Path, path: &str) -> String {
    std::fs::read_to_string(root.join(path)).unwrap()
}
