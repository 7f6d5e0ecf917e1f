pub mod scaffold;
pub mod starfield;
pub mod terrain;

#[cfg(test)]
mod tests {
    use super::{scaffold, starfield, terrain};
    use naga::valid::{Capabilities, ValidationFlags, Validator};

    /// Parses and validates `source`, returning the module.
    fn validated(source: &str) -> naga::Module {
        let module = naga::front::wgsl::parse_str(source)
            .unwrap_or_else(|e| panic!("{}", e.emit_to_string(source)));
        Validator::new(ValidationFlags::all(), Capabilities::default())
            .validate(&module)
            .unwrap_or_else(|e| panic!("{e:?}"));
        module
    }

    /// Byte size of the WGSL struct called `name`.
    fn struct_size(module: &naga::Module, name: &str) -> u32 {
        module
            .types
            .iter()
            .find_map(|(_, ty)| match &ty.inner {
                naga::TypeInner::Struct { span, .. } if ty.name.as_deref() == Some(name) => {
                    Some(*span)
                }
                _ => None,
            })
            .unwrap_or_else(|| panic!("no struct {name}"))
    }

    fn has_entry_points(module: &naga::Module, names: &[&str]) -> bool {
        names
            .iter()
            .all(|n| module.entry_points.iter().any(|ep| ep.name == *n))
    }

    #[test]
    fn terrain_shader_validates_and_matches_uniforms() {
        let module = validated(terrain::TERRAIN_WGSL);
        assert!(has_entry_points(&module, &["vs_main", "fs_main"]));
        assert_eq!(struct_size(&module, "TerrainUniforms"), 240);
        assert_eq!(
            struct_size(&module, "TerrainUniforms") as usize,
            std::mem::size_of::<terra::shading::TerrainUniformsStd140>()
        );
    }

    #[test]
    fn star_shader_validates_and_matches_uniforms() {
        let module = validated(starfield::STAR_WGSL);
        assert!(has_entry_points(&module, &["vs_main", "fs_main"]));
        assert_eq!(
            struct_size(&module, "StarUniforms") as usize,
            std::mem::size_of::<starfield::StarUniforms>()
        );
    }

    #[test]
    fn scaffold_shader_validates_and_matches_uniforms() {
        let module = validated(scaffold::SCAFFOLD_WGSL);
        assert!(has_entry_points(&module, &["vs_main", "fs_main"]));
        assert_eq!(
            struct_size(&module, "ScaffoldUniforms") as usize,
            std::mem::size_of::<scaffold::ScaffoldUniforms>()
        );
    }
}
