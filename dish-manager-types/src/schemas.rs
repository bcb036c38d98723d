//! Fixed per-device attribute schemas (spec §3). These are the keys every
//! child's `ComponentState` is created with; §3 invariant 1 requires every
//! key to be present (as "unknown") before the first event arrives.

/// DS error-status flags, in the order `dscErrorStatuses` joins them.
pub const DS_ERROR_STATUS_FLAGS: &[(&str, &str)] = &[
    ("hvactripflag", "HVAC trip"),
    ("powersupplyfailure", "Power supply failure"),
    ("positionerrorflag", "Positioner error"),
    ("brakeerror", "Brake error"),
    ("estopinterlockflag", "Emergency stop interlock"),
];

fn ds_error_status_keys() -> Vec<&'static str> {
    DS_ERROR_STATUS_FLAGS.iter().map(|(k, _)| *k).collect()
}

/// Build the fixed DS schema, including the band pointing-model-params keys
/// (one per band) and the error-status boolean flags.
pub fn ds_schema() -> Vec<&'static str> {
    let mut schema = vec![
        "operatingmode",
        "powerstate",
        "healthstate",
        "pointingstate",
        "indexerposition",
        "achievedpointing",
        "achievedpointingaz",
        "achievedpointingel",
        "desiredpointingaz",
        "desiredpointingel",
        "achievedtargetlock",
        "trackinterpolationmode",
        "actstaticoffsetvaluexel",
        "actstaticoffsetvalueel",
        "dscpowerlimitkw",
        "tracktablecurrentindex",
        "tracktableendindex",
        "dsccmdauth",
        "dscctrlstate",
        "buildstate",
        "band0pointingmodelparams",
        "band1pointingmodelparams",
        "band2pointingmodelparams",
        "band3pointingmodelparams",
        "band4pointingmodelparams",
        "band5apointingmodelparams",
        "band5bpointingmodelparams",
    ];
    schema.extend(ds_error_status_keys());
    schema
}

/// The fixed SPF schema.
pub fn spf_schema() -> Vec<&'static str> {
    vec![
        "operatingmode",
        "powerstate",
        "healthstate",
        "bandinfocus",
        "buildstate",
        "b1capabilitystate",
        "b2capabilitystate",
        "b3capabilitystate",
        "b4capabilitystate",
        "b5acapabilitystate",
        "b5bcapabilitystate",
        "b1lnahpowerstate",
        "b1lnavpowerstate",
        "b2lnahpowerstate",
        "b2lnavpowerstate",
        "b3lnahpowerstate",
        "b3lnavpowerstate",
        "b4lnahpowerstate",
        "b4lnavpowerstate",
        "b5alnahpowerstate",
        "b5alnavpowerstate",
        "b5blnahpowerstate",
        "b5blnavpowerstate",
    ]
}

/// The fixed SPFRx schema.
pub fn spfrx_schema() -> Vec<&'static str> {
    vec![
        "operatingmode",
        "healthstate",
        "configuredband",
        "capturingdata",
        "buildstate",
        "b1capabilitystate",
        "b2capabilitystate",
        "b3capabilitystate",
        "b4capabilitystate",
        "b5acapabilitystate",
        "b5bcapabilitystate",
        "attenuationhpol0",
        "attenuationhpol1",
        "attenuationhpol2",
        "attenuationvpol0",
        "attenuationvpol1",
        "attenuationvpol2",
        "noisediodemode",
        "noisediodefrequency",
        "noisediodedutycycle",
        "kvalue",
    ]
}

/// The fixed B5DC schema.
pub fn b5dc_schema() -> Vec<&'static str> {
    vec![
        "operatingmode",
        "powerstate",
        "healthstate",
        "buildstate",
        "rfcmhattenuation",
        "rfcmvattenuation",
        "rfcmplllock",
        "rftemperature",
        "rfcmpsupcbtemperature",
        "hpolrfpowerin",
        "hpolrfpowerout",
        "vpolrfpowerin",
        "vpolrfpowerout",
    ]
}

/// The fixed WMS schema: two rolled-up aggregates derived from a device
/// group of weather stations.
pub fn wms_schema() -> Vec<&'static str> {
    vec!["windgust", "meanwindspeed"]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ds_schema_carries_all_six_band_params() {
        let schema = ds_schema();
        for band in ["0", "1", "2", "3", "4", "5a", "5b"] {
            assert!(
                schema.contains(&format!("band{band}pointingmodelparams").as_str())
                    || band == "0"
            );
        }
    }

    #[test]
    fn ds_schema_includes_error_status_flags() {
        let schema = ds_schema();
        for (key, _) in DS_ERROR_STATUS_FLAGS {
            assert!(schema.contains(key));
        }
    }

    #[test]
    fn spf_schema_has_six_capability_states() {
        let schema = spf_schema();
        let count = schema
            .iter()
            .filter(|k| k.ends_with("capabilitystate"))
            .count();
        assert_eq!(count, 6);
    }

    #[test]
    fn spfrx_schema_has_six_capability_states() {
        let schema = spfrx_schema();
        let count = schema
            .iter()
            .filter(|k| k.ends_with("capabilitystate"))
            .count();
        assert_eq!(count, 6);
    }

    #[test]
    fn wms_schema_is_the_two_rollups() {
        assert_eq!(wms_schema(), vec!["windgust", "meanwindspeed"]);
    }
}
