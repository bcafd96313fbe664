//! Permutations of finite sets.
use std::collections::BTreeSet;
use std::fmt;
use std::mem::replace;
use std::ops::Index;

use num_integer::Integer;
use num_traits::ToPrimitive;
use rand::seq::SliceRandom;
use rand::Rng;
use tracing::{debug, instrument, warn};

use crate::action::{LeftAction, RightAction};
use crate::error::{InvalidPermutation, PermError};
use crate::El;

/// A permutation of a finite set.
///
/// A permutation rearranges the elements of a finite set. It is a bijection from a set to the same
/// set.
///
/// Here these sets are always {1, ..., n} for some n, called the degree of the permutation. Unlike
/// a map from points to points, a `Perm` is an immutable value: every constructor validates that
/// it describes a bijection and no operation changes an existing permutation. Operations that
/// combine permutations return new ones.
///
/// Internally a permutation is stored as a boxed slice containing the images of 1, ..., n.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Perm {
    // images[i] is the image of the point i + 1
    images: Box<[El]>,
}

fn check_degree(degree: usize) {
    // Having the degree be a valid El itself keeps all point arithmetic in range
    assert!(degree <= El::max_value() as usize);
}

fn reject(reason: InvalidPermutation) -> PermError {
    debug!(%reason, "rejected permutation");
    reason.into()
}

fn in_range(point: El, degree: usize) -> bool {
    point >= 1 && point as usize <= degree
}

impl Perm {
    /// The identity permutation of {1, ..., degree}.
    ///
    /// A degree of 0 is allowed and yields the permutation of the empty set.
    pub fn identity(degree: usize) -> Perm {
        check_degree(degree);
        Perm {
            images: (1..=degree as El).collect(),
        }
    }

    /// Create a permutation from a vector containing the images of 1, ..., n.
    ///
    /// Fails if the vector does not correspond to a permutation.
    pub fn from_images(images: Vec<El>) -> Result<Perm, PermError> {
        let degree = images.len();
        check_degree(degree);

        let mut seen = vec![false; degree];

        for (i, &image) in images.iter().enumerate() {
            if !in_range(image, degree) {
                return Err(reject(InvalidPermutation::ImageOutOfRange {
                    point: i as El + 1,
                    image,
                    degree,
                }));
            }
            if replace(&mut seen[image as usize - 1], true) {
                return Err(reject(InvalidPermutation::DuplicateImage(image)));
            }
        }

        Ok(Perm {
            images: images.into_boxed_slice(),
        })
    }

    /// Create a permutation from `(point, image)` pairs.
    ///
    /// The degree is the number of pairs. The points must be exactly 1, ..., n, each given once,
    /// and so must the images. Any map from points to points can be passed by value.
    pub fn from_mapping<I>(mapping: I) -> Result<Perm, PermError>
    where
        I: IntoIterator<Item = (El, El)>,
    {
        let pairs: Vec<(El, El)> = mapping.into_iter().collect();
        let degree = pairs.len();
        check_degree(degree);

        // 0 marks points without an assigned image
        let mut images = vec![0; degree];

        for (point, image) in pairs {
            if !in_range(point, degree) {
                return Err(reject(InvalidPermutation::PointOutOfRange { point, degree }));
            }
            if !in_range(image, degree) {
                return Err(reject(InvalidPermutation::ImageOutOfRange {
                    point,
                    image,
                    degree,
                }));
            }
            let slot = &mut images[point as usize - 1];
            if *slot != 0 {
                return Err(reject(InvalidPermutation::DuplicatePoint(point)));
            }
            *slot = image;
        }

        // With n distinct keys in 1..=n every slot is filled, only injectivity is left to check
        Self::from_images(images)
    }

    /// Create a permutation consisting of a single cycle, fixing all other points.
    ///
    /// The cycle `[1, 4, 2, 5]` maps 1 to 4, 4 to 2, 2 to 5 and 5 back to 1. The points of the
    /// cycle must be distinct and contained in {1, ..., degree}.
    pub fn from_cycle(degree: usize, cycle: &[El]) -> Result<Perm, PermError> {
        check_degree(degree);
        let mut seen = vec![false; degree];

        for &point in cycle {
            if !in_range(point, degree) {
                return Err(reject(InvalidPermutation::PointOutOfRange { point, degree }));
            }
            if replace(&mut seen[point as usize - 1], true) {
                return Err(reject(InvalidPermutation::DuplicatePoint(point)));
            }
        }

        let mut images: Vec<El> = (1..=degree as El).collect();
        for (&point, &next) in cycle.iter().zip(cycle.iter().cycle().skip(1)) {
            images[point as usize - 1] = next;
        }

        Ok(Perm {
            images: images.into_boxed_slice(),
        })
    }

    /// Create the product of several cycles.
    ///
    /// The cycles are composed right to left, so the last cycle is applied first. For disjoint
    /// cycles the order does not matter.
    pub fn from_cycles<I, C>(degree: usize, cycles: I) -> Result<Perm, PermError>
    where
        I: IntoIterator<Item = C>,
        C: AsRef<[El]>,
    {
        let mut result = Perm::identity(degree);
        for cycle in cycles {
            let cycle = Perm::from_cycle(degree, cycle.as_ref())?;
            result = result.compose_unchecked(&cycle);
        }
        Ok(result)
    }

    /// A uniformly random permutation of {1, ..., degree}.
    pub fn random<R>(degree: usize, rng: &mut R) -> Perm
    where
        R: Rng + ?Sized,
    {
        check_degree(degree);
        let mut images: Vec<El> = (1..=degree as El).collect();
        images.shuffle(rng);
        Perm {
            images: images.into_boxed_slice(),
        }
    }

    /// The size n of the set {1, ..., n} this permutation acts on.
    pub fn degree(&self) -> usize {
        self.images.len()
    }

    /// The images of 1, ..., n.
    pub fn images(&self) -> &[El] {
        &self.images
    }

    /// Iterate over `(point, image)` pairs in increasing order of points.
    pub fn iter(&self) -> impl Iterator<Item = (El, El)> + '_ {
        self.images
            .iter()
            .enumerate()
            .map(|(i, &image)| (i as El + 1, image))
    }

    fn slot(&self, point: El) -> Option<&El> {
        point
            .checked_sub(1)
            .and_then(|i| self.images.get(i as usize))
    }

    /// The image of a point.
    ///
    /// Fails when the point is outside {1, ..., n}. Use indexing for a panicking lookup.
    pub fn image(&self, point: El) -> Result<El, PermError> {
        self.slot(point)
            .copied()
            .ok_or(PermError::PointOutOfDomain {
                point,
                degree: self.degree(),
            })
    }

    /// Reassign the image of a point.
    ///
    /// Permutations are immutable, so this always fails with
    /// [`PermError::ImmutabilityViolation`]. Build a new permutation, e.g. by composing with a
    /// cycle, instead.
    pub fn set(&self, point: El, image: El) -> Result<(), PermError> {
        warn!(point, image, "attempt to modify an immutable permutation");
        Err(PermError::ImmutabilityViolation { point })
    }

    /// Whether every point is fixed.
    pub fn is_identity(&self) -> bool {
        self.iter().all(|(point, image)| point == image)
    }

    /// The composition `self ∘ other`, which applies `other` first and then `self`.
    ///
    /// Fails when the degrees differ.
    pub fn compose(&self, other: &Perm) -> Result<Perm, PermError> {
        if self.degree() != other.degree() {
            return Err(PermError::DomainMismatch {
                left: self.degree(),
                right: other.degree(),
            });
        }
        Ok(self.compose_unchecked(other))
    }

    // Callers guarantee equal degrees.
    fn compose_unchecked(&self, other: &Perm) -> Perm {
        Perm {
            images: other
                .images
                .iter()
                .map(|&image| self.images[image as usize - 1])
                .collect(),
        }
    }

    /// The inverse of this permutation.
    pub fn inverse(&self) -> Perm {
        let mut images = vec![0; self.degree()];
        for (point, image) in self.iter() {
            images[image as usize - 1] = point;
        }
        Perm {
            images: images.into_boxed_slice(),
        }
    }

    /// A power of this permutation.
    ///
    /// This implementation performs exponentiation by squaring, needing O(log |exponent|)
    /// compositions. Negative exponents are powers of the inverse.
    #[instrument(level = "trace", skip_all, fields(degree = self.degree()))]
    pub fn pow<E>(&self, exponent: E) -> Perm
    where
        E: Integer + ToPrimitive,
    {
        if exponent < E::zero() {
            // Negating the minimum of a signed type overflows, halves and remainders don't
            let (half, rem) = exponent.div_rem(&(E::one() + E::one()));
            let inverse = self.inverse();
            let half = inverse.pow_non_negative(E::zero() - half);
            half.compose_unchecked(&half)
                .compose_unchecked(&inverse.pow_non_negative(E::zero() - rem))
        } else {
            self.pow_non_negative(exponent)
        }
    }

    fn pow_non_negative<E>(&self, exp: E) -> Perm
    where
        E: Integer + ToPrimitive,
    {
        match exp.to_usize() {
            Some(0) => Perm::identity(self.degree()),
            Some(1) => self.clone(),
            _ if exp.is_odd() => self.compose_unchecked(&self.pow_non_negative(exp - E::one())),
            _ => {
                let half = self.pow_non_negative(exp / (E::one() + E::one()));
                half.compose_unchecked(&half)
            }
        }
    }

    /// A power of this permutation computed by repeated composition.
    ///
    /// Needs `exponent` compositions. This is a reference for [`Perm::pow`], not meant for
    /// general use.
    pub fn dumb_pow(&self, exponent: usize) -> Perm {
        (0..exponent).fold(Perm::identity(self.degree()), |acc, _| {
            acc.compose_unchecked(self)
        })
    }

    /// The order of this permutation, the least k ≥ 1 with `self.pow(k)` the identity.
    ///
    /// Returns None when the order does not fit into a `usize`.
    pub fn order(&self) -> Option<usize> {
        self.cycles()
            .map(|cycle| cycle.count())
            .try_fold(1usize, |order, len| (order / order.gcd(&len)).checked_mul(len))
    }

    /// Return the cycle starting at a point.
    ///
    /// Returns a 1-cycle when the point is fixed by this permutation. Fails when the point is
    /// outside {1, ..., n}.
    pub fn cycle_at(&self, point: El) -> Result<Cycle, PermError> {
        self.image(point)?;
        Ok(Cycle {
            perm: self,
            pos: Some(point),
            start: point,
        })
    }

    /// Returns an iterator over the disjoint cycles of this permutation.
    ///
    /// Every point is contained in exactly one cycle, fixed points produce 1-cycles. Each cycle
    /// starts at its smallest point and cycles are produced in increasing order of their first
    /// points.
    pub fn cycles(&self) -> Cycles {
        Cycles {
            perm: self,
            seen: vec![false; self.degree()],
            pos: 1,
        }
    }

    /// The set of cycles of this permutation, each given as the sequence of its points.
    pub fn cycle_set(&self) -> BTreeSet<Vec<El>> {
        self.cycles().map(|cycle| cycle.collect()).collect()
    }
}

impl Index<El> for Perm {
    type Output = El;

    /// The image of a point.
    ///
    /// Panics when the point is outside {1, ..., n}.
    fn index(&self, point: El) -> &El {
        match self.slot(point) {
            Some(image) => image,
            None => panic!(
                "point {} is outside the domain 1..={}",
                point,
                self.degree()
            ),
        }
    }
}

/// Application of a permutation to a point.
impl LeftAction<El> for Perm {
    type Output = Result<El, PermError>;

    fn left_apply(&self, point: El) -> Result<El, PermError> {
        self.image(point)
    }
}

/// Composition of a permutation on the left.
impl LeftAction<&Perm> for Perm {
    type Output = Result<Perm, PermError>;

    fn left_apply(&self, perm: &Perm) -> Result<Perm, PermError> {
        self.compose(perm)
    }
}

/// Composition of a permutation on the right.
impl RightAction<&Perm> for Perm {
    type Output = Result<Perm, PermError>;

    fn right_apply(&self, perm: &Perm) -> Result<Perm, PermError> {
        perm.compose(self)
    }
}

/// Application of a permutation to a vector.
///
/// For a permutation p, this moves the value at position i (counting from 1) to the position
/// p(i). Fails when the length of the vector differs from the degree.
impl<T> LeftAction<Vec<T>> for Perm {
    type Output = Result<Vec<T>, PermError>;

    fn left_apply(&self, mut values: Vec<T>) -> Result<Vec<T>, PermError> {
        if values.len() != self.degree() {
            return Err(PermError::DomainMismatch {
                left: self.degree(),
                right: values.len(),
            });
        }

        for mut cycle in self.cycles() {
            let first = cycle.next().map_or(0, |point| point as usize - 1);
            for current in cycle {
                values.swap(first, current as usize - 1);
            }
        }

        Ok(values)
    }
}

impl fmt::Display for Perm {
    /// Cycle notation, omitting fixed points.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut empty = true;

        for cycle in self.cycles().filter(|cycle| !cycle.is_fixed_point()) {
            empty = false;
            fmt::Display::fmt(&cycle, f)?;
        }

        if empty {
            f.write_str("()")?;
        }

        Ok(())
    }
}

impl fmt::Debug for Perm {
    /// Every point with its image, in increasing order of points.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("Perm ")?;
        f.debug_map().entries(self.iter()).finish()
    }
}

/// Iterator over the points of a permutation's cycle.
#[derive(Clone)]
pub struct Cycle<'a> {
    perm: &'a Perm,
    pos: Option<El>,
    start: El,
}

impl<'a> Cycle<'a> {
    /// The point this cycle starts at.
    pub fn start(&self) -> El {
        self.start
    }

    /// Whether this is a 1-cycle.
    pub fn is_fixed_point(&self) -> bool {
        self.perm[self.start] == self.start
    }
}

impl<'a> Iterator for Cycle<'a> {
    type Item = El;

    fn next(&mut self) -> Option<El> {
        self.pos.map(|pos| {
            let next = self.perm[pos];
            self.pos = if next == self.start { None } else { Some(next) };

            pos
        })
    }
}

impl<'a> fmt::Display for Cycle<'a> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut first = true;
        for el in self.clone() {
            f.write_str(if first { "(" } else { " " })?;
            first = false;
            fmt::Display::fmt(&el, f)?;
        }
        f.write_str(if first { "()" } else { ")" })
    }
}

impl<'a> fmt::Debug for Cycle<'a> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

/// Iterator over the cycles of a permutation.
#[derive(Clone)]
pub struct Cycles<'a> {
    perm: &'a Perm,
    seen: Vec<bool>,
    pos: El,
}

impl<'a> Iterator for Cycles<'a> {
    type Item = Cycle<'a>;

    fn next(&mut self) -> Option<Cycle<'a>> {
        while (self.pos as usize) <= self.perm.degree() {
            let start = self.pos;
            self.pos += 1;

            if !self.seen[start as usize - 1] {
                let cycle = Cycle {
                    perm: self.perm,
                    pos: Some(start),
                    start,
                };
                for el in cycle.clone() {
                    self.seen[el as usize - 1] = true;
                }
                return Some(cycle);
            }
        }
        None
    }
}
