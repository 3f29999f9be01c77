use std::fmt::Debug;
use std::ops::Range;
use rand::Rng;
use thiserror::Error;

#[derive(Error,Debug,Clone,PartialEq)]
pub enum MatrixError {
    #[error("Matrix size is:{matrix_size:?},but index at {accessed_index:?} was accessed")]
    IndexOutOfBounds{matrix_size:(usize,usize),accessed_index:(usize,usize)},
    #[error("This operation requires ({row},{col}) to be square, which isn't")]
    NonSquareError{row:usize,col:usize},
    #[error("Row {row} has {len} entries, but the matrix has {col_count} columns")]
    RaggedRow{row:usize,len:usize,col_count:usize},
    #[error("attempted to create {row}*{col} matrix from vector/iterator with length {len}")]
    SizeMisMatch{row:usize,col:usize,len:usize},
    #[error("entry ({row},{col}) is {value}, only finite non-negative entries are allowed")]
    InvalidEntry{row:usize,col:usize,value:f64},
    #[error("diagonal entry ({index},{index}) is {value}, a node cannot link to itself")]
    NonZeroDiagonal{index:usize,value:f64}
}

type Result<T> = std::result::Result<T,MatrixError>;

// A double precision matrix, row major order
// which means rows are stored continuously
// entry (i,j) describes the directed relation from node i to node j, 0 means "absent"
#[derive(Clone,Debug,PartialEq)]
pub struct Matrix {
    row_count:usize,
    col_count:usize,
    //row*col must equal elements.len()
    elements:Vec<f64>
}

use std::fmt::Display;
impl Display for Matrix {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.elements.is_empty() {
            return write!(f,"[]");
        }
        write!(f,"[")?;
        for (i,elem) in self.elements.iter().enumerate() {
            write!(f,"{elem}")?;
            if i+1 == self.elements.len() {
                write!(f,"]")?;
            }else if (i+1)%self.col_count == 0 {
                write!(f,",\n")?;
            }else{
                write!(f,", ")?;
            }
        }
        Ok(())
    }
}

impl Default for Matrix {
    fn default() -> Self {
        Self {
            row_count:0,
            col_count:0,
            elements:vec![]
        }
    }
}

impl Matrix {
    pub fn new_with_vec(v:Vec<f64>,row:usize,col:usize) -> Result<Self> {
        if row*col > v.len() {
            return Err(MatrixError::SizeMisMatch { row, col,len: v.len() })
        }
        if row*col == 0 {
            return Ok(Self::default())
        }
        let mut v = v;
        v.truncate(row*col);
        debug_assert_eq!(row*col,v.len());
        Ok(Self { row_count: row, col_count: col, elements: v })
    }
    // every row must have the same length as the first one
    pub fn from_rows<R:AsRef<[f64]>>(rows:&[R]) -> Result<Self> {
        let row_count = rows.len();
        let col_count = rows.first().map(|r| r.as_ref().len()).unwrap_or(0);
        let mut elements = Vec::with_capacity(row_count*col_count);
        for (row,r) in rows.iter().enumerate() {
            let r = r.as_ref();
            if r.len() != col_count {
                return Err(MatrixError::RaggedRow { row, len: r.len(), col_count })
            }
            elements.extend_from_slice(r);
        }
        Self::new_with_vec(elements, row_count, col_count)
    }
    pub fn to_rows(&self) -> Vec<Vec<f64>> {
        if self.is_empty() {
            return vec![];
        }
        self.elements.chunks(self.col_count).map(|r| r.to_vec()).collect()
    }
    pub fn get(&self,row:usize,col:usize) -> Result<f64> {
        debug_assert_eq!(self.row_count*self.col_count,self.elements.len());
        let out_of_bounds = MatrixError::IndexOutOfBounds { matrix_size:
            (self.row_count,self.col_count),
            accessed_index: (row,col)
        };
        if row >= self.row_count || col >= self.col_count {
            return Err(out_of_bounds)
        }
        self.elements.get(row*self.col_count + col).map(|n| *n).ok_or(out_of_bounds)
    }
    pub fn get_mut(&mut self,row:usize,col:usize) -> Result<&mut f64> {
        debug_assert_eq!(self.row_count*self.col_count,self.elements.len());
        let out_of_bounds = MatrixError::IndexOutOfBounds { matrix_size:
            (self.row_count,self.col_count),
            accessed_index: (row,col)
        };
        if row >= self.row_count || col >= self.col_count {
            return Err(out_of_bounds)
        }
        self.elements.get_mut(row*self.col_count + col).ok_or(out_of_bounds)
    }
    pub fn zeros(row:usize,col:usize) -> Self {
        if row*col == 0 {
            return Self::default()
        }
        Self {
            row_count:row,
            col_count:col,
            elements:vec![0.0;row*col]
        }
    }
    // symmetric matrix with a zero diagonal, each off diagonal pair is present with probability `density`
    // present entries are drawn uniformly from `range`
    pub fn rand_symmetric<T:Rng>(size:usize,density:f64,range:Range<f64>,rng:&mut T) -> Self {
        let mut m = Self::zeros(size, size);
        // NaN links nothing
        let density = if density.is_nan() {0.0} else {density.clamp(0.0, 1.0)};
        for i in 0..size {
            for j in i+1..size {
                if !rng.random_bool(density) {continue}
                let value = rng.random_range(range.clone());
                m.elements[i*size + j] = value;
                m.elements[j*size + i] = value;
            }
        }
        m
    }
    pub fn scale(&self,factor:f64) -> Self {
        Self {
            row_count:self.row_count,
            col_count:self.col_count,
            elements:self.elements.iter().map(|n| n*factor).collect()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.col_count == 0 || self.row_count == 0 || self.elements.is_empty()
    }

    pub fn dimension(&self) -> (usize,usize) {
        if self.is_empty() {return (0,0)}
        (self.row_count,self.col_count)
    }

    pub fn is_square(&self) -> bool {
        self.row_count == self.col_count
    }

    // the shape every weight/capacity/demand matrix must follow:
    // square, finite, non-negative, zero diagonal
    pub fn validate_adjacency(&self) -> Result<()> {
        if !self.is_square() {
            return Err(MatrixError::NonSquareError { row: self.row_count, col: self.col_count })
        }
        for (index,value) in self.elements.iter().enumerate() {
            let (row,col) = (index/self.col_count,index%self.col_count);
            if !value.is_finite() || *value < 0.0 {
                return Err(MatrixError::InvalidEntry { row, col, value: *value })
            }
            if row == col && *value != 0.0 {
                return Err(MatrixError::NonZeroDiagonal { index: row, value: *value })
            }
        }
        Ok(())
    }
}
