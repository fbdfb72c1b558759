use crate::health::model::AlertCategory;

use super::schema::{
    Catalog, ComponentSpec, DifferentialRule, Direction, ForecastOrder, SensorRule,
};

pub(super) fn default_staleness_minutes() -> i64 {
    15
}

pub(super) fn default_cooldown_minutes() -> i64 {
    30
}

pub(super) fn default_engine_running_rpm() -> f64 {
    300.0
}

pub(super) fn default_rpm_sensor() -> String {
    "rpm".to_string()
}

pub(super) fn default_max_summary_alerts() -> usize {
    10
}

pub(super) fn default_requires_engine_running() -> bool {
    true
}

pub(super) fn default_trend_warning_pct() -> f64 {
    10.0
}

pub(super) fn default_trend_critical_pct() -> f64 {
    20.0
}

fn sensor_rule(
    name: &str,
    label: &str,
    unit: &str,
    category: AlertCategory,
    direction: Direction,
    critical: f64,
    warning: f64,
    watch: f64,
    requires_engine_running: bool,
    trend_warning_pct: f64,
    trend_critical_pct: f64,
    action_critical: &str,
    action_warning: &str,
    action_watch: &str,
) -> SensorRule {
    SensorRule {
        name: name.to_string(),
        label: label.to_string(),
        unit: unit.to_string(),
        category,
        direction,
        critical,
        warning,
        watch,
        requires_engine_running,
        trend_warning_pct,
        trend_critical_pct,
        action_critical: action_critical.to_string(),
        action_warning: action_warning.to_string(),
        action_watch: action_watch.to_string(),
    }
}

pub(super) fn default_sensor_rules() -> Vec<SensorRule> {
    vec![
        sensor_rule(
            "oil_pressure_psi",
            "Engine oil pressure",
            "psi",
            AlertCategory::OilPressure,
            Direction::Low,
            20.0,
            25.0,
            30.0,
            true,
            15.0,
            25.0,
            "Stop the truck immediately and check oil level and pressure sender",
            "Check oil level at next stop; inspect for leaks",
            "Monitor oil pressure over the next trips",
        ),
        // Evaluated with the engine off as well: a hot reading after
        // shutdown indicates heat soak or a failed fan clutch.
        sensor_rule(
            "coolant_temp_f",
            "Coolant temperature",
            "\u{00b0}F",
            AlertCategory::CoolantTemp,
            Direction::High,
            230.0,
            220.0,
            210.0,
            false,
            5.0,
            10.0,
            "Shut down as soon as safe; engine is overheating",
            "Reduce load and verify coolant level",
            "Watch coolant temperature under load",
        ),
        sensor_rule(
            "oil_temp_f",
            "Engine oil temperature",
            "\u{00b0}F",
            AlertCategory::OilTemp,
            Direction::High,
            260.0,
            245.0,
            235.0,
            true,
            5.0,
            10.0,
            "Reduce load immediately; oil is above safe operating temperature",
            "Check oil cooler and oil grade at next service",
            "Monitor oil temperature under sustained load",
        ),
        sensor_rule(
            "trans_temp_f",
            "Transmission temperature",
            "\u{00b0}F",
            AlertCategory::TransmissionTemp,
            Direction::High,
            250.0,
            225.0,
            210.0,
            true,
            5.0,
            10.0,
            "Pull over and let the transmission cool; inspect cooler lines",
            "Check transmission fluid level and cooler",
            "Monitor transmission temperature on grades",
        ),
        sensor_rule(
            "def_level_pct",
            "DEF tank level",
            "%",
            AlertCategory::DefLevel,
            Direction::Low,
            5.0,
            10.0,
            15.0,
            false,
            20.0,
            40.0,
            "Refill DEF now; engine derate is imminent",
            "Refill DEF at the next fuel stop",
            "Plan a DEF refill",
        ),
        sensor_rule(
            "battery_voltage",
            "Battery voltage",
            "V",
            AlertCategory::BatteryVoltage,
            Direction::Low,
            11.8,
            12.2,
            12.5,
            false,
            5.0,
            10.0,
            "Battery is failing; truck may not restart after shutdown",
            "Load-test the batteries and check the alternator",
            "Monitor charging voltage",
        ),
        sensor_rule(
            "fuel_pressure_psi",
            "Fuel rail pressure",
            "psi",
            AlertCategory::FuelPressure,
            Direction::Low,
            35.0,
            45.0,
            50.0,
            true,
            10.0,
            20.0,
            "Replace fuel filter now; risk of injector damage",
            "Replace fuel filter at next service",
            "Monitor fuel pressure; filter may be loading up",
        ),
        sensor_rule(
            "intake_temp_f",
            "Intake manifold temperature",
            "\u{00b0}F",
            AlertCategory::IntakeTemp,
            Direction::High,
            150.0,
            135.0,
            125.0,
            true,
            8.0,
            15.0,
            "Inspect charge air cooler immediately; boost air is overheating",
            "Check charge air cooler for external blockage",
            "Monitor intake temperature under boost",
        ),
    ]
}

pub(super) fn default_differential_rules() -> Vec<DifferentialRule> {
    vec![DifferentialRule {
        name: "oil_over_coolant".to_string(),
        minuend: "oil_temp_f".to_string(),
        subtrahend: "coolant_temp_f".to_string(),
        warning: 25.0,
        critical: 40.0,
        action: "Oil running hot relative to coolant; inspect oil cooler and thermostat"
            .to_string(),
    }]
}

fn component_spec(
    name: &str,
    label: &str,
    primary_sensor: &str,
    secondary_sensor: Option<&str>,
    weibull_shape_prior: f64,
    weibull_scale_prior: f64,
    forecast_order: ForecastOrder,
    weight_weibull: f64,
    weight_arima: f64,
    failure_threshold: f64,
    cost_low: f64,
    cost_high: f64,
    maintenance_action: &str,
) -> ComponentSpec {
    ComponentSpec {
        name: name.to_string(),
        label: label.to_string(),
        primary_sensor: primary_sensor.to_string(),
        secondary_sensor: secondary_sensor.map(str::to_string),
        weibull_shape_prior,
        weibull_scale_prior,
        forecast_order,
        weight_weibull,
        weight_arima,
        failure_threshold,
        cost_low,
        cost_high,
        maintenance_action: maintenance_action.to_string(),
    }
}

pub(super) fn default_component_specs() -> Vec<ComponentSpec> {
    vec![
        component_spec(
            "engine",
            "Engine",
            "oil_pressure_psi",
            Some("coolant_temp_f"),
            2.1,
            14000.0,
            ForecastOrder { p: 2, d: 1, q: 1 },
            0.6,
            0.4,
            20.0,
            3500.0,
            12000.0,
            "Schedule an engine inspection: oil analysis, bearing check",
        ),
        component_spec(
            "water_pump",
            "Water pump",
            "coolant_temp_f",
            None,
            1.8,
            9000.0,
            ForecastOrder { p: 1, d: 1, q: 1 },
            0.5,
            0.5,
            230.0,
            400.0,
            1500.0,
            "Inspect water pump weep hole and drive; pressure-test cooling system",
        ),
        component_spec(
            "transmission",
            "Transmission",
            "trans_temp_f",
            None,
            2.4,
            12000.0,
            ForecastOrder { p: 1, d: 1, q: 1 },
            0.6,
            0.4,
            250.0,
            2500.0,
            8000.0,
            "Service transmission: fluid, filter, cooler flow check",
        ),
        component_spec(
            "battery",
            "Battery bank",
            "battery_voltage",
            None,
            1.5,
            17500.0,
            ForecastOrder { p: 1, d: 1, q: 1 },
            0.7,
            0.3,
            11.8,
            150.0,
            400.0,
            "Load-test and replace weak batteries as a set",
        ),
        component_spec(
            "fuel_system",
            "Fuel system",
            "fuel_pressure_psi",
            None,
            2.0,
            10000.0,
            ForecastOrder { p: 2, d: 1, q: 1 },
            0.5,
            0.5,
            35.0,
            300.0,
            1200.0,
            "Replace fuel filters; inspect lift pump",
        ),
    ]
}

impl Default for Catalog {
    fn default() -> Self {
        Self {
            staleness_minutes: default_staleness_minutes(),
            cooldown_minutes: default_cooldown_minutes(),
            engine_running_rpm: default_engine_running_rpm(),
            rpm_sensor: default_rpm_sensor(),
            max_summary_alerts: default_max_summary_alerts(),
            sensors: default_sensor_rules(),
            differentials: default_differential_rules(),
            components: default_component_specs(),
        }
    }
}
