pub struct Helpers {}

impl Helpers {
    /// elements of `a` that are not in `b`, in the order of `a`
    pub fn get_difference_between_vectors<T: PartialEq + Clone>(a: &[T], b: &[T]) -> Vec<T> {
        let mut difference = Vec::new();
        for x in a {
            if !b.contains(x) {
                difference.push(x.to_owned());
            }
        }

        difference
    }

    /// elements of `a` that are also in `b`, in the order of `a`
    pub fn get_common_elements<T: PartialEq + Clone>(a: &[T], b: &[T]) -> Vec<T> {
        a.iter().filter(|x| b.contains(x)).cloned().collect()
    }
}
