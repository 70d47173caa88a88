use crate::battery::tensor::{FeatureRow, TIMESTEPS};

/// Discharge window from battery B0005, used by the SOC demo endpoint.
pub const SOC_DEMO_ROWS: [FeatureRow; TIMESTEPS] = DISCHARGE_WINDOW;

/// The SOH demo endpoint feeds the same window to the SOH model.
pub const SOH_DEMO_ROWS: [FeatureRow; TIMESTEPS] = DISCHARGE_WINDOW;

const DISCHARGE_WINDOW: [FeatureRow; TIMESTEPS] = [
    [24.0, 4.19, -0.004, 24.33, -0.0006, 0.0, 0.0, 167.0],
    [24.0, 4.19, -0.001, 24.32, -0.0006, 4.2, 16.7, 167.0],
    [24.0, 3.25, -0.001, 35.29, -0.0006, 0.0, 3608.5, 167.0],
    [24.0, 3.26, -0.001, 35.02, -0.0006, 0.0, 3628.9, 167.0],
    [24.0, 3.26, -0.000, 34.75, -0.0006, 0.0, 3649.3, 167.0],
    [24.0, 3.27, -0.000, 34.49, -0.0006, 0.0, 3669.8, 167.0],
    [24.0, 3.27, -0.006, 34.23, -0.0006, 0.0, 3690.2, 167.0],
    [24.0, 3.27, -0.006, 34.23, -0.0006, 0.0, 3690.2, 167.0],
    [24.0, 3.27, -0.006, 34.23, -0.0006, 0.0, 3690.2, 167.0],
    [24.0, 3.27, -0.006, 34.23, -0.0006, 0.0, 3690.2, 167.0],
];
