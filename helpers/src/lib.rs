pub mod general;
pub mod laptime;

#[cfg(test)]
mod general_tests {
    use crate::general::{argmin, argsort, SortOrder};

    #[test]
    fn test_argmin_1() {
        let x: Vec<f64> = vec![];
        assert_eq!(argmin(&x), None);
    }
    #[test]
    fn test_argmin_2() {
        let x: Vec<f64> = vec![1.2, 1.1, 1.1, 0.9];
        assert_eq!(argmin(&x), Some(3));
    }
    #[test]
    fn test_argmin_3() {
        // first occurrence wins on ties
        let x: Vec<f64> = vec![2.0, 1.5, 1.8, 1.5];
        assert_eq!(argmin(&x), Some(1));
    }

    #[test]
    fn test_argsort_1() {
        let x: Vec<i32> = vec![3, -1, 5, 8, -2];
        assert_eq!(argsort(&x, SortOrder::Ascending), vec![4, 1, 0, 2, 3]);
    }
    #[test]
    fn test_argsort_2() {
        let x: Vec<f64> = vec![3.0, -1.0, 5.0, 8.0, -2.0];
        assert_eq!(argsort(&x, SortOrder::Descending), vec![3, 2, 0, 1, 4]);
    }
    #[test]
    fn test_argsort_3() {
        let x: Vec<f64> = vec![1.2, 1.1, 1.1, 0.9];
        assert_eq!(argsort(&x, SortOrder::Ascending), vec![3, 1, 2, 0]);
    }
}

#[cfg(test)]
mod laptime_tests {
    use crate::laptime::{fmt_laptime, fmt_opt_laptime, ranked_laptimes, NO_LAPTIME};
    use approx::assert_ulps_eq;

    #[test]
    fn test_fmt_laptime() {
        assert_eq!(fmt_laptime(12.3456), "12.346");
        assert_eq!(fmt_laptime(0.05), "0.050");
    }
    #[test]
    fn test_fmt_opt_laptime() {
        assert_eq!(fmt_opt_laptime(None), NO_LAPTIME);
        assert_eq!(fmt_opt_laptime(Some(1.5)), "1.500");
    }
    #[test]
    fn test_ranked_laptimes() {
        let ranked = ranked_laptimes(&[2.0, 1.5, 1.8]);
        assert_eq!(ranked.len(), 3);
        assert_eq!(ranked[0].0, 2);
        assert_ulps_eq!(ranked[0].1, 1.5);
        assert_eq!(ranked[1].0, 3);
        assert_eq!(ranked[2].0, 1);
    }
}
