// rov_core/src/utils/integrators.rs

use nalgebra::DVector;

/// A numerical scheme that advances `x' = f(x, t)` from `t0` to `tf`.
pub trait Integrator<T> {
    fn step(
        &self,
        func: &dyn Fn(&DVector<T>, T) -> DVector<T>,
        x0: &DVector<T>,
        t0: T,
        tf: T,
    ) -> DVector<T>;
}

/// First-order Runge-Kutta (forward Euler).
///
/// Every derivative is evaluated at `x0`, so a kinematic chain like
/// `p' = v, v' = a` advances position with the velocity from *before* the step.
#[derive(Debug, Default, Clone, Copy)]
pub struct RK1;

impl<T> Integrator<T> for RK1
where
    T: Copy
        + std::ops::Sub<Output = T>
        + std::ops::Mul<DVector<T>, Output = DVector<T>>
        + num_traits::Float,
    DVector<T>: std::ops::Add<Output = DVector<T>>,
{
    fn step(
        &self,
        func: &dyn Fn(&DVector<T>, T) -> DVector<T>,
        x0: &DVector<T>,
        t0: T,
        tf: T,
    ) -> DVector<T> {
        let dt: T = tf - t0;
        x0.clone() + dt * func(x0, t0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn rk1_is_a_single_euler_step() {
        // x' = -x from x0 = 2 over dt = 0.1 gives 2 - 0.2.
        let func = |x: &DVector<f64>, _t: f64| -x;
        let x0 = DVector::from_vec(vec![2.0]);
        let x1 = RK1.step(&func, &x0, 0.0, 0.1);
        assert_abs_diff_eq!(x1[0], 1.8, epsilon = 1e-12);
    }

    #[test]
    fn rk1_with_zero_span_returns_initial_state() {
        let func = |_x: &DVector<f64>, _t: f64| DVector::from_vec(vec![5.0, -5.0]);
        let x0 = DVector::from_vec(vec![1.0, 2.0]);
        assert_eq!(RK1.step(&func, &x0, 3.0, 3.0), x0);
    }
}
