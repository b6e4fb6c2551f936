//! Built-in templates for the standard Packer artifacts.

use crate::template::BuiltinTemplate;

const PACKER_JSON: &str = include_str!("../defaults/packer.json");
const AUTOUNATTEND_XML: &str = include_str!("../defaults/Autounattend.xml");
const VAGRANTFILE: &str = include_str!("../defaults/Vagrantfile");

/// Built-in Packer template, unattended install answer file and Vagrantfile.
pub fn builtin_templates() -> Vec<BuiltinTemplate> {
    vec![
        BuiltinTemplate::new("packer.json", PACKER_JSON),
        BuiltinTemplate::new("Autounattend.xml", AUTOUNATTEND_XML),
        BuiltinTemplate::new("Vagrantfile", VAGRANTFILE),
    ]
}
