//! Build tier resolution.
//!
//! The four tier flags are resolved exactly once per run through an ordered
//! rule list; the first matching rule wins and `Standard` is the fallback.

use lens_deploy_common::BuildTier;

/// Tier-selecting flags as given on the command line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TierFlags {
    pub config_only: bool,
    pub skip_build: bool,
    pub force_rebuild: bool,
    pub fast: bool,
}

type Rule = (fn(&TierFlags) -> bool, BuildTier);

/// Precedence: config-only > skip-build > force-rebuild > fast > standard.
const RULES: [Rule; 4] = [
    (|f| f.config_only, BuildTier::ConfigOnly),
    (|f| f.skip_build, BuildTier::SkipBuild),
    (|f| f.force_rebuild, BuildTier::ForceRebuild),
    (|f| f.fast, BuildTier::FastDeploy),
];

/// Resolve the single tier for this run.
#[must_use]
pub fn resolve(flags: &TierFlags) -> BuildTier {
    RULES
        .iter()
        .find(|(applies, _)| applies(flags))
        .map_or(BuildTier::Standard, |(_, tier)| *tier)
}

/// Names of the flags that were set but lost to a higher-precedence flag.
#[must_use]
pub fn overridden(flags: &TierFlags) -> Vec<&'static str> {
    let chosen = resolve(flags);
    [
        (flags.config_only, BuildTier::ConfigOnly, "--config-only"),
        (flags.skip_build, BuildTier::SkipBuild, "--skip-build"),
        (flags.force_rebuild, BuildTier::ForceRebuild, "--force-rebuild"),
        (flags.fast, BuildTier::FastDeploy, "--fast"),
    ]
    .into_iter()
    .filter(|(set, tier, _)| *set && *tier != chosen)
    .map(|(_, _, name)| name)
    .collect()
}
