use super::*;

#[test]
fn first_order_polynomial_is_affine() {
    // x' = 1 + 2x + 3y, y' = -1 + 0.5x + y
    let poly = Polynomial2D::new(vec![1.0, 2.0, 3.0], vec![-1.0, 0.5, 1.0]).unwrap();
    assert_eq!(poly.order(), 1);
    let q = poly.apply(Point::new(2.0, 4.0));
    assert_eq!(q, Point::new(17.0, 4.0));
}

#[test]
fn second_order_terms_follow_monomial_order() {
    // x' = x², y' = xy
    let poly = Polynomial2D::new(
        vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0],
        vec![0.0, 0.0, 0.0, 0.0, 1.0, 0.0],
    )
    .unwrap();
    assert_eq!(poly.order(), 2);
    assert_eq!(poly.apply(Point::new(3.0, 5.0)), Point::new(9.0, 15.0));
}

#[test]
fn rejects_bad_coefficient_counts() {
    assert!(Polynomial2D::new(vec![1.0, 2.0], vec![1.0, 2.0]).is_err());
    assert!(Polynomial2D::new(vec![0.0; 3], vec![0.0; 6]).is_err());
    assert!(Polynomial2D::new(vec![0.0; 4], vec![0.0; 4]).is_err());
}

#[test]
fn affine_variant_applies_kurbo_affine() {
    let t = CoordinateTransform::Affine(Affine::translate((5.0, -2.0)));
    assert_eq!(t.apply(Point::new(1.0, 1.0)), Point::new(6.0, -1.0));
}
