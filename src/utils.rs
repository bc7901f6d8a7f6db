//! Convenience methods for constructing grids in a way that echoes,
//! but does not exactly match, methods common in scripting languages.
use itertools::Itertools;
use num_traits::Float;

/// Generates evenly spaced values from start to stop,
/// including the endpoint.
///
/// Returns just `start` for `n == 1` and nothing for `n == 0`.
pub fn linspace<T>(start: T, stop: T, n: usize) -> Vec<T>
where
    T: Float,
{
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let dx: T = (stop - start) / T::from(n - 1).unwrap_or_else(T::nan);
            (0..n)
                .map(|i| start + T::from(i).unwrap_or_else(T::nan) * dx)
                .collect()
        }
    }
}

/// Generates a meshgrid in C ordering (x0, y0, z0, x0, y0, z1, ..., x0, yn, zn),
/// which is also the order of a table's data block.
pub fn meshgrid<T>(x: Vec<&Vec<T>>) -> Vec<Vec<T>>
where
    T: Float,
{
    x.into_iter()
        .multi_cartesian_product()
        .map(|xx| xx.iter().map(|y| **y).collect())
        .collect()
}

/// Fill a row-major data block by evaluating `f` at every grid point.
pub fn tabulate<T, F>(axes: &[Vec<T>], f: F) -> Vec<T>
where
    T: Float,
    F: Fn(&[T]) -> T,
{
    meshgrid(axes.iter().collect())
        .iter()
        .map(|p| f(p))
        .collect()
}

#[cfg(test)]
mod test {
    use super::{linspace, meshgrid, tabulate};

    #[test]
    fn test_linspace() {
        assert_eq!(linspace(0.0, 1.0, 3), vec![0.0, 0.5, 1.0]);
        assert_eq!(linspace(2.0, 5.0, 1), vec![2.0]);
        assert!(linspace(2.0_f64, 5.0, 0).is_empty());
    }

    #[test]
    fn test_meshgrid_order() {
        let x = vec![0.0, 1.0];
        let y = vec![10.0, 20.0, 30.0];
        let g = meshgrid(vec![&x, &y]);
        assert_eq!(g.len(), 6);
        assert_eq!(g[1], vec![0.0, 20.0]);
        assert_eq!(g[3], vec![1.0, 10.0]);

        let z = tabulate(&[x, y], |p| p[0] + p[1]);
        assert_eq!(z, vec![10.0, 20.0, 30.0, 11.0, 21.0, 31.0]);
    }
}
