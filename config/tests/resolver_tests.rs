//! Tests for configure flag resolution

use assert_matches::assert_matches;
use vimbuild_config::{
    BuildSettings, ConfigError, Feature, FeatureSet, FlagResolver, RequestedState, StaticProbe,
};

fn resolver() -> FlagResolver {
    FlagResolver::new(BuildSettings::new("/usr/local", "/usr/local/Cellar/vim/8.0.1500"))
}

mod scenario_tests {
    use super::*;

    #[test]
    fn test_python3_wins_over_default_python() {
        let features = FeatureSet::new().with(Feature::Python3);
        assert_eq!(features.request(Feature::Python), RequestedState::Default);

        let resolution = resolver()
            .resolve(&features, &StaticProbe::all_available())
            .unwrap();
        let config = &resolution.config;

        assert!(config.is_enabled(Feature::Python3));
        assert!(!config.is_enabled(Feature::Python));
        assert!(config.has_flag("--enable-python3interp"));
        assert!(!config.has_flag("--enable-pythoninterp"));

        assert_eq!(resolution.notices.len(), 1);
        assert_eq!(resolution.notices[0].kept, Feature::Python3);
        assert_eq!(resolution.notices[0].dropped, vec![Feature::Python]);
    }

    #[test]
    fn test_lua_wins_over_luajit() {
        let features = FeatureSet::parse_options(["with-lua", "with-luajit"]).unwrap();
        let resolution = resolver()
            .resolve(&features, &StaticProbe::all_available())
            .unwrap();
        let config = &resolution.config;

        assert!(config.has_flag("--enable-luainterp"));
        assert!(!config.has_flag("--with-luajit"));
        assert_eq!(resolution.notices.len(), 1);
        assert_eq!(resolution.notices[0].kept, Feature::Lua);
        assert!(resolution.notices[0].message.contains("Proceeding with Lua"));
    }

    #[test]
    fn test_without_gettext_disables_nls() {
        let features = FeatureSet::parse_options(["without-gettext"]).unwrap();
        let config = resolver()
            .resolve(&features, &StaticProbe::all_available())
            .unwrap()
            .config;

        assert!(config.has_flag("--disable-nls"));
    }

    #[test]
    fn test_with_gettext_keeps_nls() {
        let features = FeatureSet::parse_options(["with-gettext"]).unwrap();
        let config = resolver()
            .resolve(&features, &StaticProbe::all_available())
            .unwrap()
            .config;

        assert!(!config.has_flag("--disable-nls"));
    }

    #[test]
    fn test_client_server() {
        let features = FeatureSet::parse_options(["with-client-server"]).unwrap();
        let config = resolver()
            .resolve(&features, &StaticProbe::all_available())
            .unwrap()
            .config;
        assert!(config.has_flag("--with-x"));
        assert!(!config.has_flag("--without-x"));

        let config = resolver()
            .resolve(&FeatureSet::new(), &StaticProbe::all_available())
            .unwrap()
            .config;
        assert!(config.has_flag("--without-x"));
        assert!(!config.has_flag("--with-x"));
    }

    #[test]
    fn test_requested_feature_with_missing_dependency() {
        let features = FeatureSet::parse_options(["with-lua"]).unwrap();
        let probe = StaticProbe::all_available().missing(Feature::Lua);
        let err = resolver().resolve(&features, &probe).unwrap_err();

        assert_matches!(err, ConfigError::MissingDependency { ref feature } if feature == "lua");
        assert!(err.to_string().contains("lua"));
    }
}

mod ordering_tests {
    use super::*;

    #[test]
    fn test_flag_order_ignores_request_order() {
        let a = FeatureSet::parse_options(["with-tcl", "with-lua", "with-client-server"]).unwrap();
        let b = FeatureSet::parse_options(["with-client-server", "with-lua", "with-tcl"]).unwrap();
        let probe = StaticProbe::all_available();

        let a = resolver().resolve(&a, &probe).unwrap();
        let b = resolver().resolve(&b, &probe).unwrap();
        assert_eq!(a, b);

        let lua = a.config.flags().iter().position(|f| f == "--enable-luainterp");
        let tcl = a.config.flags().iter().position(|f| f == "--enable-tclinterp");
        assert!(lua < tcl);
    }

    #[test]
    fn test_fixed_flags_follow_feature_flags() {
        let config = resolver()
            .resolve(&FeatureSet::new(), &StaticProbe::all_available())
            .unwrap()
            .config;
        let prefix = config
            .flags()
            .iter()
            .position(|f| f.starts_with("--prefix="))
            .unwrap();
        let without_x = config.flags().iter().position(|f| f == "--without-x").unwrap();

        assert!(without_x < prefix);
        assert_eq!(config.flags().last().map(String::as_str), Some("--enable-gui=no"));
    }

    #[test]
    fn test_override_system_vi_adds_no_flags() {
        let base = resolver()
            .resolve(&FeatureSet::new(), &StaticProbe::all_available())
            .unwrap()
            .config;
        let features = FeatureSet::parse_options(["override-system-vi"]).unwrap();
        let config = resolver()
            .resolve(&features, &StaticProbe::all_available())
            .unwrap()
            .config;

        assert!(config.is_enabled(Feature::OverrideSystemVi));
        assert_eq!(config.flags(), base.flags());
    }

    #[test]
    fn test_nothing_available() {
        let config = resolver()
            .resolve(&FeatureSet::new(), &StaticProbe::none_available())
            .unwrap()
            .config;

        assert!(config.enabled().is_empty());
        assert!(!config.flags().iter().any(|f| f.ends_with("interp")));
    }
}
